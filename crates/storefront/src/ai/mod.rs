//! AI text generation.
//!
//! A thin façade over a chat-completion API: content generation builds a
//! prompt per content type, recommendations feed the published catalog as
//! context and fall back to keyword matching when the model's output does
//! not parse.

pub mod openai;
pub mod prompts;
pub mod recommend;

pub use openai::OpenAiClient;
pub use recommend::{Recommendation, RecommendationRequest, recommend};

use thiserror::Error;

/// Errors that can occur when generating text.
#[derive(Debug, Error)]
pub enum AiError {
    /// No API key configured.
    #[error("text generation is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A chat-completion backend.
///
/// One method is enough: callers own the prompts and the parsing of what
/// comes back.
pub trait TextGenerator: Send + Sync + 'static {
    /// Run a single system + user exchange and return the model's text.
    fn generate(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> impl Future<Output = Result<String, AiError>> + Send;
}
