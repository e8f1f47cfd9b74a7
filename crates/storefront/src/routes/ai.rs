//! AI recommendation and content generation route handlers.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use homegrid_core::GeneratedContentKind;
use homegrid_core::catalog::CatalogQuery;

use crate::ai::prompts::{content_prompt, content_system};
use crate::ai::{RecommendationRequest, TextGenerator, recommend};
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::middleware::auth::{OptionalAuth, authorize_admin};
use crate::state::AppState;
use crate::store::Store;

/// How much of the catalog the model sees as context.
const CONTEXT_LIMIT: u32 = 100;

const CONTENT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Deserialize)]
pub struct GenerateContentBody {
    #[serde(rename = "type")]
    pub kind: GeneratedContentKind,
    pub topic: String,
}

fn model_name<S, G, T>(state: &AppState<S, G, T>) -> Option<&str>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    state.config().openai.as_ref().map(|c| c.model.as_str())
}

/// Recommend products for a free-text query.
///
/// Always answers: when the model is unavailable or its output does not
/// parse, a keyword fallback over the published catalog is used instead.
pub async fn recommendations<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    if request.query.trim().is_empty() {
        return Err(AppError::BadRequest("Query is required".to_owned()));
    }

    let page = state
        .store()
        .search_products(CatalogQuery {
            page: 1,
            limit: CONTEXT_LIMIT,
            ..CatalogQuery::default()
        })
        .await?;

    let recommendations = recommend(state.generator(), &page.items, &request).await;

    Ok(Json(json!({
        "recommendations": recommendations,
        "query": request.query,
        "generatedAt": Utc::now(),
        "model": model_name(&state),
    })))
}

/// Generate an editorial draft for a topic. Admin-gated; drafts are
/// reviewed before they become content rows.
pub async fn generate_content<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    headers: HeaderMap,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<GenerateContentBody>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    authorize_admin(state.config(), &headers, user.as_ref())?;

    if body.topic.trim().is_empty() {
        return Err(AppError::BadRequest("Topic is required".to_owned()));
    }

    let content = state
        .generator()
        .generate(
            content_system(body.kind),
            &content_prompt(body.kind, &body.topic),
            CONTENT_MAX_TOKENS,
        )
        .await?;

    Ok(Json(json!({
        "content": content,
        "type": body.kind,
        "topic": body.topic,
        "generatedAt": Utc::now(),
        "model": model_name(&state),
    })))
}
