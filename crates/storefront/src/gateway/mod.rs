//! Payment gateway integration.
//!
//! The [`PaymentGateway`] trait covers the one outbound call checkout needs
//! (creating a hosted checkout session); everything else arrives via signed
//! webhooks, parsed here into [`WebhookEvent`].

pub mod signature;
pub mod stripe;

pub use signature::verify_signature;
pub use stripe::StripeGateway;

use serde_json::Value;
use thiserror::Error;

use homegrid_core::{CartId, Currency, UserId};

/// Errors from payment gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client could not be constructed from configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport failure.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gateway returned a non-success status.
    #[error("Gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    /// Webhook signature verification failed.
    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    /// Webhook payload could not be parsed.
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// A line of a checkout session, priced from the cart snapshot.
#[derive(Debug, Clone)]
pub struct SessionLine {
    pub name: String,
    pub description: String,
    /// First product image, shown on the hosted checkout page.
    pub image: Option<String>,
    pub unit_amount_cents: i64,
    pub quantity: i32,
}

/// Request to create a hosted checkout session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub lines: Vec<SessionLine>,
    pub currency: Currency,
    pub success_url: String,
    pub cancel_url: String,
    /// Carried in session metadata and echoed back by the webhook.
    pub cart_id: CartId,
    /// Carried in session metadata and echoed back by the webhook.
    pub user_id: UserId,
    pub customer_email: Option<String>,
}

/// A created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Outbound payment gateway operations.
pub trait PaymentGateway: Send + Sync + 'static {
    /// Create a hosted checkout session the customer is redirected to.
    fn create_checkout_session(
        &self,
        request: SessionRequest,
    ) -> impl Future<Output = Result<CheckoutSession, GatewayError>> + Send;
}

/// A parsed gateway webhook event.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    /// Customer completed the hosted checkout.
    CheckoutCompleted {
        session_id: String,
        payment_intent: Option<String>,
        cart_id: CartId,
        user_id: UserId,
        amount_total: i64,
        currency: Currency,
        shipping: Value,
        billing: Value,
    },
    /// Payment captured after checkout.
    PaymentSucceeded { payment_intent: String },
    /// Payment failed after checkout.
    PaymentFailed { payment_intent: String },
    /// Any event type we do not act on.
    Other { event_type: String },
}

fn metadata_id(object: &Value, key: &str) -> Result<i32, GatewayError> {
    object
        .pointer(&format!("/metadata/{key}"))
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| GatewayError::InvalidPayload(format!("missing metadata.{key}")))
}

impl WebhookEvent {
    /// Parse a raw webhook body into an event.
    ///
    /// Event types we do not handle parse to [`WebhookEvent::Other`] rather
    /// than an error, so the handler can acknowledge them.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidPayload` when the body is not JSON or a
    /// handled event type is missing required fields.
    pub fn parse(body: &str) -> Result<Self, GatewayError> {
        let event: Value = serde_json::from_str(body)
            .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;

        let event_type = event
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::InvalidPayload("missing event type".to_owned()))?;
        let object = event
            .pointer("/data/object")
            .ok_or_else(|| GatewayError::InvalidPayload("missing data.object".to_owned()))?;

        match event_type {
            "checkout.session.completed" => {
                let session_id = object
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| GatewayError::InvalidPayload("missing session id".to_owned()))?
                    .to_owned();
                let payment_intent = object
                    .get("payment_intent")
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned);
                let amount_total = object
                    .get("amount_total")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| {
                        GatewayError::InvalidPayload("missing amount_total".to_owned())
                    })?;
                let currency = object
                    .get("currency")
                    .and_then(Value::as_str)
                    .and_then(|raw| raw.to_uppercase().parse().ok())
                    .ok_or_else(|| GatewayError::InvalidPayload("missing currency".to_owned()))?;

                Ok(Self::CheckoutCompleted {
                    session_id,
                    payment_intent,
                    cart_id: CartId::new(metadata_id(object, "cart_id")?),
                    user_id: UserId::new(metadata_id(object, "user_id")?),
                    amount_total,
                    currency,
                    shipping: object
                        .get("shipping_details")
                        .cloned()
                        .unwrap_or(Value::Null),
                    billing: object
                        .get("customer_details")
                        .cloned()
                        .unwrap_or(Value::Null),
                })
            }
            "payment_intent.succeeded" | "payment_intent.payment_failed" => {
                let payment_intent = object
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| GatewayError::InvalidPayload("missing intent id".to_owned()))?
                    .to_owned();
                if event_type == "payment_intent.succeeded" {
                    Ok(Self::PaymentSucceeded { payment_intent })
                } else {
                    Ok(Self::PaymentFailed { payment_intent })
                }
            }
            other => Ok(Self::Other {
                event_type: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completed_body() -> String {
        json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_123",
                "payment_intent": "pi_test_456",
                "amount_total": 12999,
                "currency": "cad",
                "metadata": { "cart_id": "7", "user_id": "3" },
                "shipping_details": { "address": { "city": "Toronto" } },
                "customer_details": { "email": "a@b.c" }
            }}
        })
        .to_string()
    }

    #[test]
    fn parses_checkout_completed() {
        let event = WebhookEvent::parse(&completed_body()).unwrap();
        match event {
            WebhookEvent::CheckoutCompleted {
                session_id,
                payment_intent,
                cart_id,
                user_id,
                amount_total,
                currency,
                ..
            } => {
                assert_eq!(session_id, "cs_test_123");
                assert_eq!(payment_intent.as_deref(), Some("pi_test_456"));
                assert_eq!(cart_id, CartId::new(7));
                assert_eq!(user_id, UserId::new(3));
                assert_eq!(amount_total, 12999);
                assert_eq!(currency, Currency::CAD);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn parses_payment_failed() {
        let body = json!({
            "type": "payment_intent.payment_failed",
            "data": { "object": { "id": "pi_test_456" } }
        })
        .to_string();
        let event = WebhookEvent::parse(&body).unwrap();
        assert!(matches!(
            event,
            WebhookEvent::PaymentFailed { payment_intent } if payment_intent == "pi_test_456"
        ));
    }

    #[test]
    fn unknown_event_type_is_other() {
        let body = json!({
            "type": "invoice.created",
            "data": { "object": {} }
        })
        .to_string();
        let event = WebhookEvent::parse(&body).unwrap();
        assert!(matches!(event, WebhookEvent::Other { event_type } if event_type == "invoice.created"));
    }

    #[test]
    fn missing_metadata_is_rejected() {
        let body = json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_123",
                "amount_total": 100,
                "currency": "cad",
                "metadata": {}
            }}
        })
        .to_string();
        assert!(WebhookEvent::parse(&body).is_err());
    }
}
