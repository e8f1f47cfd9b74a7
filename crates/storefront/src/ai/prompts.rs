//! Prompt construction for content generation and recommendations.

use homegrid_core::GeneratedContentKind;

pub const RECOMMENDATION_SYSTEM: &str = "You are an expert smart home consultant. \
    Analyze the user's query and recommend the best products from the available \
    inventory. Consider compatibility, budget, user preferences, and ecosystem \
    requirements.";

/// Build the user prompt for a recommendation request.
#[must_use]
pub fn recommendation_prompt(
    query: &str,
    preferences: Option<&str>,
    budget: Option<&str>,
    ecosystem: Option<&str>,
    product_context: &serde_json::Value,
) -> String {
    format!(
        "User Query: \"{query}\"\n\n\
         Preferences: {}\n\
         Budget: {}\n\
         Ecosystem: {}\n\n\
         Available Products:\n{product_context}\n\n\
         Recommend 3-5 products that best match the user's needs. Respond with a \
         JSON array where each element has the fields: productId, title, brand, \
         price, reason, benefits, considerations. Respond with JSON only.",
        preferences.unwrap_or("Not specified"),
        budget.unwrap_or("Not specified"),
        ecosystem.unwrap_or("Not specified"),
    )
}

/// System prompt for a given content kind.
#[must_use]
pub const fn content_system(kind: GeneratedContentKind) -> &'static str {
    match kind {
        GeneratedContentKind::Guide => {
            "You are an expert smart home consultant and technical writer. Create \
             comprehensive, accurate, and helpful guides about smart home technology. \
             Focus on practical advice, current technology, and real-world applications."
        }
        GeneratedContentKind::ProductReview => {
            "You are a smart home product expert and reviewer. Provide detailed, \
             unbiased reviews of smart home products based on current market data \
             and user experiences."
        }
        GeneratedContentKind::Troubleshooting => {
            "You are a smart home technical support specialist. Help users solve \
             common smart home problems with clear, step-by-step solutions."
        }
        GeneratedContentKind::Comparison => {
            "You are a smart home technology analyst. Provide detailed comparisons \
             between smart home products, ecosystems, and technologies."
        }
    }
}

/// User prompt for a given content kind and topic.
#[must_use]
pub fn content_prompt(kind: GeneratedContentKind, topic: &str) -> String {
    match kind {
        GeneratedContentKind::Guide => format!(
            "Create a detailed smart home guide about \"{topic}\". Include:\n\
             - Introduction and overview\n\
             - Step-by-step instructions\n\
             - Common challenges and solutions\n\
             - Best practices\n\
             - Product recommendations\n\
             - Safety considerations\n\
             - Future trends\n\n\
             Make it beginner-friendly but comprehensive."
        ),
        GeneratedContentKind::ProductReview => format!(
            "Write a comprehensive product review for \"{topic}\". Include:\n\
             - Product overview and specifications\n\
             - Pros and cons\n\
             - Performance analysis\n\
             - Compatibility information\n\
             - Value for money\n\
             - Comparison with alternatives\n\
             - Final recommendation"
        ),
        GeneratedContentKind::Troubleshooting => format!(
            "Create a troubleshooting guide for \"{topic}\". Include:\n\
             - Problem identification\n\
             - Step-by-step solutions\n\
             - Common causes\n\
             - Prevention tips\n\
             - When to contact support\n\
             - Alternative solutions"
        ),
        GeneratedContentKind::Comparison => format!(
            "Create a detailed comparison for \"{topic}\". Include:\n\
             - Feature comparison\n\
             - Pros and cons of each option\n\
             - Use case recommendations\n\
             - Price analysis\n\
             - Compatibility considerations\n\
             - Final recommendation"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_prompt_includes_defaults() {
        let prompt = recommendation_prompt("hue bulbs", None, None, None, &serde_json::json!([]));
        assert!(prompt.contains("User Query: \"hue bulbs\""));
        assert!(prompt.contains("Preferences: Not specified"));
        assert!(prompt.contains("Budget: Not specified"));
    }

    #[test]
    fn content_prompt_mentions_topic() {
        let prompt = content_prompt(GeneratedContentKind::Troubleshooting, "Zigbee pairing");
        assert!(prompt.contains("Zigbee pairing"));
        assert!(prompt.contains("Step-by-step solutions"));
    }
}
