//! Product recommendation flow.
//!
//! The model sees the published catalog as compact JSON and is asked for a
//! JSON array of picks. When its output fails to parse we fall back to a
//! keyword match over the same catalog, so the endpoint always answers.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::models::ProductWithCategory;

use super::prompts::{RECOMMENDATION_SYSTEM, recommendation_prompt};
use super::TextGenerator;

const MAX_TOKENS: u32 = 1500;
const FALLBACK_LIMIT: usize = 5;

/// A recommendation request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub query: String,
    pub preferences: Option<String>,
    pub budget: Option<String>,
    pub ecosystem: Option<String>,
}

/// A single product pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub product_id: i32,
    pub title: String,
    pub brand: String,
    pub price: i64,
    pub reason: String,
    pub benefits: String,
    pub considerations: String,
}

/// Compact per-product JSON handed to the model as context.
fn product_context(products: &[ProductWithCategory]) -> serde_json::Value {
    let entries: Vec<_> = products
        .iter()
        .map(|p| {
            json!({
                "id": p.product.id,
                "title": p.product.title,
                "brand": p.product.brand,
                "category": p.category_name,
                "price": p.product.price_cad,
                "features": {
                    "worksGoogle": p.product.compat.google,
                    "worksAlexa": p.product.compat.alexa,
                    "worksHa": p.product.compat.ha,
                    "worksMatter": p.product.compat.matter,
                    "worksZigbee": p.product.compat.zigbee,
                    "worksZwave": p.product.compat.zwave,
                    "worksThread": p.product.compat.thread,
                    "beginnerFriendly": p.product.beginner_friendly,
                },
                "description": p.product.short_desc,
            })
        })
        .collect();
    json!(entries)
}

/// Keyword fallback over title, brand, and short description.
fn keyword_fallback(query: &str, products: &[ProductWithCategory]) -> Vec<Recommendation> {
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|p| {
            p.product.title.to_lowercase().contains(&needle)
                || p.product.brand.to_lowercase().contains(&needle)
                || p.product.short_desc.to_lowercase().contains(&needle)
        })
        .take(FALLBACK_LIMIT)
        .map(|p| Recommendation {
            product_id: p.product.id.as_i32(),
            title: p.product.title.clone(),
            brand: p.product.brand.clone(),
            price: p.product.price_cad,
            reason: format!("Matches your search for \"{query}\""),
            benefits: p.product.short_desc.clone(),
            considerations: if p.product.requires_bridge.is_empty() {
                "No additional requirements".to_owned()
            } else {
                "Requires additional hub".to_owned()
            },
        })
        .collect()
}

/// Strip a Markdown code fence if the model wrapped its JSON in one.
fn unfence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

/// Generate recommendations for a query, falling back to keyword matching
/// when the generator call fails or its output does not parse as the
/// expected schema.
pub async fn recommend<T: TextGenerator>(
    generator: &T,
    products: &[ProductWithCategory],
    request: &RecommendationRequest,
) -> Vec<Recommendation> {
    let context = product_context(products);
    let prompt = recommendation_prompt(
        &request.query,
        request.preferences.as_deref(),
        request.budget.as_deref(),
        request.ecosystem.as_deref(),
        &context,
    );

    let raw = match generator
        .generate(RECOMMENDATION_SYSTEM, &prompt, MAX_TOKENS)
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!(query = %request.query, error = %e, "Generator call failed, using keyword fallback");
            return keyword_fallback(&request.query, products);
        }
    };

    match serde_json::from_str::<Vec<Recommendation>>(unfence(&raw)) {
        Ok(recommendations) if !recommendations.is_empty() => recommendations,
        Ok(_) | Err(_) => {
            warn!(query = %request.query, "Model output did not parse, using keyword fallback");
            keyword_fallback(&request.query, products)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use crate::testutil::{materialize, new_product};
    use homegrid_core::CategoryId;

    struct CannedGenerator(String);

    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _: &str, _: &str, _: u32) -> Result<String, AiError> {
            Ok(self.0.clone())
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _: &str, _: &str, _: u32) -> Result<String, AiError> {
            Err(AiError::Api {
                status: 503,
                message: "overloaded".to_owned(),
            })
        }
    }

    fn catalog() -> Vec<ProductWithCategory> {
        let mut bulb = materialize(1, new_product("HUE-1", CategoryId::new(1)));
        bulb.title = "Philips Hue A19 Colour Bulb".to_owned();
        bulb.brand = "Philips Hue".to_owned();
        bulb.requires_bridge = vec!["Hue Bridge".to_owned()];

        let mut plug = materialize(2, new_product("KASA-1", CategoryId::new(1)));
        plug.title = "Kasa Smart Plug".to_owned();
        plug.brand = "TP-Link".to_owned();

        vec![
            ProductWithCategory {
                product: bulb,
                category_name: "Lighting".to_owned(),
            },
            ProductWithCategory {
                product: plug,
                category_name: "Plugs".to_owned(),
            },
        ]
    }

    #[tokio::test]
    async fn valid_model_output_is_used() {
        let generator = CannedGenerator(
            serde_json::json!([{
                "productId": 2,
                "title": "Kasa Smart Plug",
                "brand": "TP-Link",
                "price": 2999,
                "reason": "Simple starter device",
                "benefits": "Works without a hub",
                "considerations": "Wi-Fi only"
            }])
            .to_string(),
        );
        let request = RecommendationRequest {
            query: "easy plug".to_owned(),
            preferences: None,
            budget: None,
            ecosystem: None,
        };
        let picks = recommend(&generator, &catalog(), &request).await;
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].product_id, 2);
    }

    #[tokio::test]
    async fn fenced_model_output_is_accepted() {
        let generator = CannedGenerator(
            "```json\n[{\"productId\":1,\"title\":\"t\",\"brand\":\"b\",\"price\":1,\
             \"reason\":\"r\",\"benefits\":\"x\",\"considerations\":\"c\"}]\n```"
                .to_owned(),
        );
        let request = RecommendationRequest {
            query: "anything".to_owned(),
            preferences: None,
            budget: None,
            ecosystem: None,
        };
        let picks = recommend(&generator, &catalog(), &request).await;
        assert_eq!(picks[0].product_id, 1);
    }

    #[tokio::test]
    async fn malformed_output_falls_back_to_keywords() {
        let generator = CannedGenerator("Here are my picks: the Hue bulb!".to_owned());
        let request = RecommendationRequest {
            query: "hue".to_owned(),
            preferences: None,
            budget: None,
            ecosystem: None,
        };
        let picks = recommend(&generator, &catalog(), &request).await;
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].title, "Philips Hue A19 Colour Bulb");
        assert_eq!(picks[0].considerations, "Requires additional hub");
        assert!(picks[0].reason.contains("hue"));
    }

    #[tokio::test]
    async fn call_failure_falls_back_to_keywords() {
        let request = RecommendationRequest {
            query: "hue".to_owned(),
            preferences: None,
            budget: None,
            ecosystem: None,
        };
        let picks = recommend(&FailingGenerator, &catalog(), &request).await;
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].title, "Philips Hue A19 Colour Bulb");
        assert!(picks[0].reason.contains("hue"));
    }
}
