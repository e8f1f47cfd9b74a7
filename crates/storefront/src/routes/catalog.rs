//! Catalog listing route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::json;

use homegrid_core::catalog::{CatalogParams, CatalogQuery};

use crate::ai::TextGenerator;
use crate::error::Result;
use crate::gateway::PaymentGateway;
use crate::models::ProductView;
use crate::state::AppState;
use crate::store::Store;

/// Filtered, paginated listing of published products.
///
/// All parameters are optional; malformed numeric parameters are ignored
/// rather than rejected.
pub async fn index<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let query = CatalogQuery::from_params(params);
    let page = state.store().search_products(query.clone()).await?;

    let products: Vec<ProductView> = page.items.into_iter().map(ProductView::from).collect();

    Ok(Json(json!({
        "products": products,
        "pagination": {
            "page": query.page,
            "limit": query.limit,
            "total": page.total,
            "pages": query.pages(page.total),
        },
    })))
}
