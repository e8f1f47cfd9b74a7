//! `OpenAI` chat-completions client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::OpenAiConfig;

use super::{AiError, TextGenerator};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f64 = 0.7;

/// `OpenAI` implementation of [`TextGenerator`].
///
/// Constructed from an optional configuration; when no API key is set every
/// call returns [`AiError::NotConfigured`] so routes can surface a clean
/// error instead of the server refusing to boot.
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Option<OpenAiInner>,
}

#[derive(Clone)]
struct OpenAiInner {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

impl OpenAiClient {
    /// Create a client, or a disabled one when `config` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key contains non-header bytes or the
    /// HTTP client cannot be constructed.
    pub fn new(config: Option<&OpenAiConfig>) -> Result<Self, AiError> {
        let Some(config) = config else {
            return Ok(Self { inner: None });
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth =
            HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
                .map_err(|e| AiError::Parse(format!("Invalid API key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Some(OpenAiInner {
                client,
                base_url: config.base_url.clone(),
                model: config.model.clone(),
            }),
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }
}

impl TextGenerator for OpenAiClient {
    #[instrument(skip(self, system, user))]
    async fn generate(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, AiError> {
        let Some(inner) = &self.inner else {
            return Err(AiError::NotConfigured);
        };

        let request = ChatRequest {
            model: &inner.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
            temperature: TEMPERATURE,
        };

        let response = inner
            .client
            .post(format!("{}/chat/completions", inner.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| "unknown error".to_owned());
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AiError::Parse("empty completion".to_owned()))
    }
}
