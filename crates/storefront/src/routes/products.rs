//! Product detail route handler.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;

use homegrid_core::ProductId;

use crate::ai::TextGenerator;
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::models::{ProductView, RelatedProductView};
use crate::state::AppState;
use crate::store::Store;

const RELATED_LIMIT: i64 = 4;

/// Product detail plus up to four others from the same category.
///
/// Unpublished products 404 like missing ones; the distinction is not
/// leaked to shoppers.
pub async fn show<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let id = ProductId::new(id);
    let row = state
        .store()
        .product(id)
        .await?
        .filter(|row| row.product.published)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let related = state
        .store()
        .related_products(row.product.category_id, id, RELATED_LIMIT)
        .await?;
    let related: Vec<RelatedProductView> = related
        .iter()
        .map(|r| RelatedProductView::from(&r.product))
        .collect();

    Ok(Json(json!({
        "product": ProductView::from(row),
        "relatedProducts": related,
    })))
}
