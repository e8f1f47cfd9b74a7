//! Payment gateway webhook handler.
//!
//! Unauthenticated by design; the signature header is the only credential.
//! Verification happens against the raw body before anything is parsed or
//! any store write is attempted.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::ai::TextGenerator;
use crate::checkout;
use crate::error::{AppError, Result};
use crate::gateway::{PaymentGateway, WebhookEvent, signature::verify_signature};
use crate::state::AppState;
use crate::store::Store;

/// Signature header set by the gateway.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Apply a signed gateway event.
///
/// Invalid or missing signatures are a `400` with no side effects. Events
/// we do not act on are acknowledged so the gateway stops redelivering.
pub async fn payment<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing signature header".to_owned()))?;

    verify_signature(
        &state.config().stripe.webhook_secret,
        header,
        &body,
        Utc::now().timestamp(),
        state.config().stripe.webhook_tolerance_secs,
    )
    .map_err(|err| {
        warn!(error = %err, "Webhook signature rejected");
        AppError::BadRequest("Invalid signature".to_owned())
    })?;

    let event = WebhookEvent::parse(&body)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    checkout::handle_event(state.store(), event).await?;
    Ok(Json(json!({ "received": true })))
}
