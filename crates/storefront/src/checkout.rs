//! Checkout orchestration.
//!
//! Two halves: creating a hosted checkout session from the customer's cart,
//! and fulfilling the webhook events the gateway sends back. Fulfilment is
//! idempotent per session id (the store enforces a unique constraint), so a
//! redelivered webhook never creates a second order or decrements stock
//! twice.

use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::gateway::{CheckoutSession, PaymentGateway, SessionLine, SessionRequest, WebhookEvent};
use crate::models::{NewOrder, NewOrderItem, User};
use crate::store::{OrderOutcome, Store};
use homegrid_core::OrderStatus;

/// Create a hosted checkout session for the user's current cart.
///
/// The cart must exist and be non-empty, and every line must be coverable
/// by current stock; stock itself is only decremented at fulfilment. The
/// session is denominated in the cart's currency.
///
/// # Errors
///
/// `BadRequest` for an empty cart, `Conflict` naming the product when stock
/// is short, or a gateway error.
pub async fn create_session<S, G>(
    store: &S,
    gateway: &G,
    base_url: &str,
    user: &User,
) -> Result<CheckoutSession>
where
    S: Store,
    G: PaymentGateway,
{
    let Some(cart) = store.cart_for_user(user.id).await? else {
        return Err(AppError::BadRequest("Cart is empty".to_owned()));
    };
    let items = store.cart_items(cart.id).await?;
    if items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_owned()));
    }

    for item in &items {
        if item.product.stock < item.item.qty {
            return Err(AppError::Conflict(format!(
                "Insufficient stock for {}",
                item.product.title
            )));
        }
    }

    let lines = items
        .iter()
        .map(|item| SessionLine {
            name: item.product.title.clone(),
            description: item.product.short_desc.clone(),
            image: item.product.images.first().cloned(),
            unit_amount_cents: item.item.unit_price,
            quantity: item.item.qty,
        })
        .collect();

    let session = gateway
        .create_checkout_session(SessionRequest {
            lines,
            currency: cart.currency,
            success_url: format!("{base_url}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base_url}/checkout/cancel"),
            cart_id: cart.id,
            user_id: user.id,
            customer_email: Some(user.email.clone()),
        })
        .await?;

    info!(session_id = %session.id, cart_id = %cart.id, "Checkout session created");
    Ok(session)
}

/// Apply a verified webhook event to the store.
///
/// Unknown event types and missing carts are acknowledged without error so
/// the gateway stops redelivering them.
pub async fn handle_event<S: Store>(store: &S, event: WebhookEvent) -> Result<()> {
    match event {
        WebhookEvent::CheckoutCompleted {
            session_id,
            payment_intent,
            cart_id,
            user_id,
            amount_total,
            currency,
            shipping,
            billing,
        } => {
            let Some(cart) = store.cart_by_id(cart_id).await? else {
                warn!(session_id = %session_id, cart_id = %cart_id, "Cart not found for session");
                return Ok(());
            };
            let items = store.cart_items(cart.id).await?;

            let outcome = store
                .create_order(NewOrder {
                    user_id,
                    total_cents: amount_total,
                    currency,
                    gateway_session_id: session_id.clone(),
                    gateway_payment_intent: payment_intent,
                    shipping_addr: shipping,
                    billing_addr: billing,
                    items: items
                        .iter()
                        .map(|item| NewOrderItem {
                            product_id: item.item.product_id,
                            qty: item.item.qty,
                            unit_price: item.item.unit_price,
                        })
                        .collect(),
                })
                .await?;

            let order = match outcome {
                OrderOutcome::Created(order) => order,
                OrderOutcome::DuplicateSession => {
                    info!(session_id = %session_id, "Session already fulfilled, skipping");
                    return Ok(());
                }
            };

            for item in &items {
                let decremented = store
                    .try_decrement_stock(item.item.product_id, item.item.qty)
                    .await?;
                if !decremented {
                    warn!(
                        order_id = %order.id,
                        product_id = %item.item.product_id,
                        qty = item.item.qty,
                        "Stock short at fulfilment, order kept"
                    );
                }
            }

            store.clear_cart(cart.id).await?;
            info!(order_id = %order.id, session_id = %session_id, "Order created");
        }
        WebhookEvent::PaymentSucceeded { payment_intent } => {
            let updated = store
                .set_order_status_by_intent(&payment_intent, OrderStatus::Processing)
                .await?;
            info!(intent = %payment_intent, updated, "Payment succeeded");
        }
        WebhookEvent::PaymentFailed { payment_intent } => {
            let updated = store
                .set_order_status_by_intent(&payment_intent, OrderStatus::Cancelled)
                .await?;
            info!(intent = %payment_intent, updated, "Payment failed, order cancelled");
        }
        WebhookEvent::Other { event_type } => {
            debug!(event_type = %event_type, "Unhandled event type");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::store::memory::MemStore;
    use crate::testutil::new_product;
    use homegrid_core::{Currency, UserRole};
    use serde_json::Value;
    use std::sync::Mutex;

    struct FakeGateway;

    impl PaymentGateway for FakeGateway {
        async fn create_checkout_session(
            &self,
            request: SessionRequest,
        ) -> std::result::Result<CheckoutSession, GatewayError> {
            Ok(CheckoutSession {
                id: format!("cs_fake_{}", request.cart_id),
                url: "https://checkout.test/session".to_owned(),
            })
        }
    }

    /// Captures the session request so tests can assert on what was sent.
    #[derive(Default)]
    struct RecordingGateway(Mutex<Option<SessionRequest>>);

    impl PaymentGateway for RecordingGateway {
        async fn create_checkout_session(
            &self,
            request: SessionRequest,
        ) -> std::result::Result<CheckoutSession, GatewayError> {
            let id = format!("cs_fake_{}", request.cart_id);
            *self.0.lock().unwrap() = Some(request);
            Ok(CheckoutSession {
                id,
                url: "https://checkout.test/session".to_owned(),
            })
        }
    }

    async fn seeded_cart(store: &MemStore) -> (User, crate::models::Cart) {
        let category = store.upsert_category("Sensors", None, None).await.unwrap();
        let product = store
            .upsert_product(new_product("AQARA-1", category))
            .await
            .unwrap();
        let user = store
            .create_user("shopper@example.com", "hash", UserRole::Customer)
            .await
            .unwrap();
        let cart = store.create_cart(user.id, Currency::CAD).await.unwrap();
        store
            .insert_cart_item(cart.id, product, 2, 2499)
            .await
            .unwrap();
        (user, cart)
    }

    fn completed(session_id: &str, cart: &crate::models::Cart, user: &User) -> WebhookEvent {
        WebhookEvent::CheckoutCompleted {
            session_id: session_id.to_owned(),
            payment_intent: Some("pi_1".to_owned()),
            cart_id: cart.id,
            user_id: user.id,
            amount_total: 4998,
            currency: Currency::CAD,
            shipping: Value::Null,
            billing: Value::Null,
        }
    }

    #[tokio::test]
    async fn session_requires_non_empty_cart() {
        let store = MemStore::new();
        let user = store
            .create_user("shopper@example.com", "hash", UserRole::Customer)
            .await
            .unwrap();
        let result = create_session(&store, &FakeGateway, "https://shop.test", &user).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn session_lines_carry_cart_currency_and_product_details() {
        let store = MemStore::new();
        let category = store.upsert_category("Sensors", None, None).await.unwrap();
        let product = store
            .upsert_product(new_product("AQARA-1", category))
            .await
            .unwrap();
        let user = store
            .create_user("shopper@example.com", "hash", UserRole::Customer)
            .await
            .unwrap();
        let cart = store.create_cart(user.id, Currency::USD).await.unwrap();
        store
            .insert_cart_item(cart.id, product, 2, 1999)
            .await
            .unwrap();

        let gateway = RecordingGateway::default();
        create_session(&store, &gateway, "https://shop.test", &user)
            .await
            .unwrap();

        let request = gateway.0.lock().unwrap().take().expect("request sent");
        assert_eq!(request.currency, Currency::USD);
        assert_eq!(request.lines.len(), 1);
        let line = &request.lines[0];
        assert_eq!(line.name, "Product AQARA-1");
        assert_eq!(line.description, "A compact zigbee sensor");
        assert_eq!(line.image.as_deref(), Some("/images/AQARA-1.jpg"));
        assert_eq!(line.unit_amount_cents, 1999);
        assert_eq!(line.quantity, 2);
    }

    #[tokio::test]
    async fn session_rejects_insufficient_stock() {
        let store = MemStore::new();
        let (user, cart) = seeded_cart(&store).await;
        let item = store.cart_items(cart.id).await.unwrap();
        store.set_stock(item[0].item.product_id, 1).await.unwrap();

        let result = create_session(&store, &FakeGateway, "https://shop.test", &user).await;
        match result {
            Err(AppError::Conflict(msg)) => assert!(msg.contains("Insufficient stock")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fulfilment_creates_order_and_clears_cart() {
        let store = MemStore::new();
        let (user, cart) = seeded_cart(&store).await;
        let product_id = store.cart_items(cart.id).await.unwrap()[0].item.product_id;

        handle_event(&store, completed("cs_1", &cart, &user))
            .await
            .unwrap();

        let order = store.order_by_session("cs_1").await.unwrap().unwrap();
        assert_eq!(order.total_cents, 4998);
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(store.cart_items(cart.id).await.unwrap().is_empty());

        let product = store.product(product_id).await.unwrap().unwrap();
        assert_eq!(product.product.stock, 8);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_idempotent() {
        let store = MemStore::new();
        let (user, cart) = seeded_cart(&store).await;
        let product_id = store.cart_items(cart.id).await.unwrap()[0].item.product_id;

        handle_event(&store, completed("cs_1", &cart, &user))
            .await
            .unwrap();
        handle_event(&store, completed("cs_1", &cart, &user))
            .await
            .unwrap();

        // One order, one decrement.
        let product = store.product(product_id).await.unwrap().unwrap();
        assert_eq!(product.product.stock, 8);
        assert!(store.order_by_session("cs_1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn payment_failure_cancels_order() {
        let store = MemStore::new();
        let (user, cart) = seeded_cart(&store).await;
        handle_event(&store, completed("cs_1", &cart, &user))
            .await
            .unwrap();

        handle_event(
            &store,
            WebhookEvent::PaymentFailed {
                payment_intent: "pi_1".to_owned(),
            },
        )
        .await
        .unwrap();

        let order = store.order_by_session("cs_1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn unknown_cart_is_acknowledged() {
        let store = MemStore::new();
        let user = store
            .create_user("shopper@example.com", "hash", UserRole::Customer)
            .await
            .unwrap();
        let event = WebhookEvent::CheckoutCompleted {
            session_id: "cs_missing".to_owned(),
            payment_intent: None,
            cart_id: homegrid_core::CartId::new(999),
            user_id: user.id,
            amount_total: 100,
            currency: Currency::CAD,
            shipping: Value::Null,
            billing: Value::Null,
        };
        handle_event(&store, event).await.unwrap();
        assert!(store.order_by_session("cs_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stock_short_at_fulfilment_keeps_order() {
        let store = MemStore::new();
        let (user, cart) = seeded_cart(&store).await;
        let product_id = store.cart_items(cart.id).await.unwrap()[0].item.product_id;
        store.set_stock(product_id, 1).await.unwrap();

        handle_event(&store, completed("cs_1", &cart, &user))
            .await
            .unwrap();

        // Order exists, stock untouched because the guard refused the decrement.
        assert!(store.order_by_session("cs_1").await.unwrap().is_some());
        let product = store.product(product_id).await.unwrap().unwrap();
        assert_eq!(product.product.stock, 1);
    }
}
