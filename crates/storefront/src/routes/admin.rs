//! Catalog maintenance route handlers.
//!
//! Callers need both a logged-in admin session and the shared `x-admin-key`
//! header. Job failures do not fail the request; the run report carries
//! per-step errors.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use serde::Deserialize;

use crate::ai::TextGenerator;
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::jobs::{JobRunner, RunReport, UpdateKind};
use crate::middleware::auth::{OptionalAuth, authorize_admin};
use crate::state::AppState;
use crate::store::Store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    pub update_type: String,
}

/// Run the full maintenance pass.
pub async fn update_data<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    headers: HeaderMap,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<RunReport>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    authorize_admin(state.config(), &headers, user.as_ref())?;

    let runner = JobRunner::new(state.store(), state.config().jobs);
    let report = runner.run(UpdateKind::Full).await;
    Ok(Json(report))
}

/// Run a targeted maintenance pass (`prices`, `stock`, `availability` or
/// `full`).
pub async fn update_prices<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    headers: HeaderMap,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<UpdateBody>,
) -> Result<Json<RunReport>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    authorize_admin(state.config(), &headers, user.as_ref())?;

    let kind: UpdateKind = body
        .update_type
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown update type: {}", body.update_type)))?;

    let runner = JobRunner::new(state.store(), state.config().jobs);
    let report = runner.run(kind).await;
    Ok(Json(report))
}
