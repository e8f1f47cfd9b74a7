//! Checkout session route handler.

use axum::{Json, extract::State};
use serde_json::json;

use crate::ai::TextGenerator;
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::middleware::auth::RequireAuth;
use crate::state::AppState;
use crate::store::Store;

/// Create a hosted checkout session for the current cart.
///
/// Stock is validated but not reserved; the decrement happens when the
/// gateway confirms payment.
pub async fn create_session<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    // Session data can outlive the account; re-fetch before charging.
    let user = state
        .store()
        .user_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("login required".to_owned()))?;

    let session = crate::checkout::create_session(
        state.store(),
        state.gateway(),
        &state.config().base_url,
        &user,
    )
    .await?;

    Ok(Json(json!({
        "checkoutUrl": session.url,
        "sessionId": session.id,
    })))
}
