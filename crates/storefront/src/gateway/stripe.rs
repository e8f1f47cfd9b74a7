//! Stripe REST client.
//!
//! Talks to the Checkout Sessions API with form-encoded requests, per
//! <https://docs.stripe.com/api/checkout/sessions/create>.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::StripeConfig;

use super::{CheckoutSession, GatewayError, PaymentGateway, SessionRequest};

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Stripe implementation of [`PaymentGateway`].
#[derive(Clone)]
pub struct StripeGateway {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key contains non-header bytes or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &StripeConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            config.secret_key.expose_secret()
        ))
        .map_err(|e| GatewayError::Config(format!("Invalid secret key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL (used against a local mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Flatten a session request into Stripe's bracketed form fields.
fn session_form(request: &SessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_owned(), "payment".to_owned()),
        ("success_url".to_owned(), request.success_url.clone()),
        ("cancel_url".to_owned(), request.cancel_url.clone()),
        (
            "metadata[cart_id]".to_owned(),
            request.cart_id.as_i32().to_string(),
        ),
        (
            "metadata[user_id]".to_owned(),
            request.user_id.as_i32().to_string(),
        ),
    ];
    if let Some(email) = &request.customer_email {
        form.push(("customer_email".to_owned(), email.clone()));
    }
    let currency = request.currency.code().to_lowercase();
    for (i, line) in request.lines.iter().enumerate() {
        form.push((
            format!("line_items[{i}][price_data][currency]"),
            currency.clone(),
        ));
        form.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            line.unit_amount_cents.to_string(),
        ));
        form.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            line.name.clone(),
        ));
        form.push((
            format!("line_items[{i}][price_data][product_data][description]"),
            line.description.clone(),
        ));
        if let Some(image) = &line.image {
            form.push((
                format!("line_items[{i}][price_data][product_data][images][0]"),
                image.clone(),
            ));
        }
        form.push((format!("line_items[{i}][quantity]"), line.quantity.to_string()));
    }
    form
}

impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(lines = request.lines.len()))]
    async fn create_checkout_session(
        &self,
        request: SessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&session_form(&request))
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
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response.json().await?;
        let Some(url) = session.url else {
            return Err(GatewayError::InvalidResponse(
                "session has no redirect url".to_owned(),
            ));
        };

        debug!(session_id = %session.id, "Checkout session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}
