//! Consultation booking and proposal route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use homegrid_core::BookingId;
use homegrid_core::pricing::{BomLine, quote};

use crate::ai::TextGenerator;
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::middleware::auth::RequireAuth;
use crate::models::NewProposal;
use crate::state::AppState;
use crate::store::Store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalBody {
    pub booking_id: i32,
    pub bom: Vec<BomLine>,
    pub labor_hours_est: Option<f64>,
    pub notes: Option<String>,
}

/// Book a consultation slot.
pub async fn create_booking<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateBookingBody>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    if body.scheduled_at < Utc::now() {
        return Err(AppError::BadRequest(
            "Booking time must be in the future".to_owned(),
        ));
    }
    let booking = state
        .store()
        .create_booking(user.id, body.scheduled_at, body.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "booking": booking }))))
}

/// Price a bill of materials into a draft proposal.
///
/// The booking must belong to the caller; someone else's booking id 404s.
pub async fn create<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateProposalBody>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let booking = state
        .store()
        .booking_for_user(BookingId::new(body.booking_id), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_owned()))?;

    let priced =
        quote(&body.bom, body.labor_hours_est).map_err(|err| AppError::BadRequest(err.to_string()))?;

    let proposal = state
        .store()
        .create_proposal(NewProposal {
            user_id: user.id,
            booking_id: booking.id,
            bom: body.bom,
            labor_hours_est: body.labor_hours_est,
            price_range: priced.range,
            notes: body.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "proposal": proposal }))))
}

/// The caller's proposals, newest first.
pub async fn index<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let proposals = state.store().proposals_for_user(user.id).await?;
    Ok(Json(json!({ "proposals": proposals })))
}
