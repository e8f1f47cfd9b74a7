//! Editorial content route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;

use homegrid_core::ContentType;

use crate::ai::TextGenerator;
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::state::AppState;
use crate::store::Store;

#[derive(Debug, Default, Deserialize)]
pub struct ContentParams {
    /// Optional filter: GUIDE, BLOG or FAQ.
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

/// Published content, optionally filtered by type.
pub async fn index<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    Query(params): Query<ContentParams>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let content_type = match params.content_type.as_deref() {
        None => None,
        Some(raw) => Some(
            raw.parse::<ContentType>()
                .map_err(|_| AppError::BadRequest(format!("Unknown content type: {raw}")))?,
        ),
    };

    let content = state.store().published_content(content_type).await?;
    Ok(Json(json!({ "content": content })))
}

/// One published content entry by slug.
pub async fn show<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let content = state
        .store()
        .content_by_slug(&slug)
        .await?
        .filter(|content| content.published)
        .ok_or_else(|| AppError::NotFound("Content not found".to_owned()))?;
    Ok(Json(json!({ "content": content })))
}
