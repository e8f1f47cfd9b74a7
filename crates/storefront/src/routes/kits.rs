//! Kit bundle route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;

use crate::ai::TextGenerator;
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::models::RelatedProductView;
use crate::state::AppState;
use crate::store::Store;

/// All published kits.
pub async fn index<S, G, T>(
    State(state): State<AppState<S, G, T>>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let kits = state.store().published_kits().await?;
    Ok(Json(json!({ "kits": kits })))
}

/// One published kit with its ordered contents.
pub async fn show<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let detail = state
        .store()
        .kit_by_slug(&slug)
        .await?
        .filter(|detail| detail.kit.published)
        .ok_or_else(|| AppError::NotFound("Kit not found".to_owned()))?;

    let items: Vec<serde_json::Value> = detail
        .items
        .iter()
        .map(|item| {
            json!({
                "product": RelatedProductView::from(&item.product),
                "qty": item.item.qty,
            })
        })
        .collect();

    Ok(Json(json!({ "kit": detail.kit, "items": items })))
}
