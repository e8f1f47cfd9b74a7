//! Health check route handler.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::error;

use crate::ai::TextGenerator;
use crate::gateway::PaymentGateway;
use crate::state::AppState;
use crate::store::Store;

/// Report store connectivity and basic catalog counts.
///
/// Returns `503` when the store cannot be reached so load balancers take
/// the instance out of rotation.
pub async fn health<S, G, T>(State(state): State<AppState<S, G, T>>) -> impl IntoResponse
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    if let Err(err) = state.store().ping().await {
        error!(error = %err, "Health check failed");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy" })),
        );
    }

    let stats = state.store().catalog_stats().await.unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "products": stats.products,
            "categories": stats.categories,
            "orders": stats.orders,
        })),
    )
}
