//! Checkout session and webhook idempotency tests.

use chrono::Utc;
use homegrid_integration_tests::{
    TestApp, checkout_completed_body, seed_product, sign_webhook,
};
use homegrid_core::OrderStatus;
use homegrid_storefront::store::Store;
use serde_json::{Value, json};

struct Checkout {
    app: TestApp,
    product_id: homegrid_core::ProductId,
    cart_id: i32,
    user_id: i32,
}

/// Register, fill the cart with 2 units and create a checkout session.
async fn checkout_fixture(stock: i32) -> Checkout {
    let app = TestApp::spawn().await;
    let product = seed_product(&app.store, "SENSOR-1", 2500, stock).await;
    app.register("shopper@example.com", "hunter2hunter2").await;

    let resp = app
        .client
        .post(app.url("/cart/items"))
        .json(&json!({ "productId": product.id, "qty": 2 }))
        .send()
        .await
        .expect("add to cart");
    assert_eq!(resp.status(), 201);

    let resp = app
        .client
        .post(app.url("/checkout/session"))
        .send()
        .await
        .expect("create session");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json");
    assert!(body["checkoutUrl"].as_str().expect("url").starts_with("https://"));
    assert!(!body["sessionId"].as_str().expect("session id").is_empty());

    let user = app
        .store
        .user_by_email("shopper@example.com")
        .await
        .expect("query")
        .expect("user");
    let cart = app
        .store
        .cart_for_user(user.id)
        .await
        .expect("query")
        .expect("cart");

    Checkout {
        app,
        product_id: product.id,
        cart_id: cart.id.as_i32(),
        user_id: user.id.as_i32(),
    }
}

async fn post_webhook(app: &TestApp, body: &str, header: &str) -> reqwest::Response {
    app.client
        .post(app.url("/webhooks/payment"))
        .header("stripe-signature", header)
        .body(body.to_owned())
        .send()
        .await
        .expect("webhook request")
}

async fn stock_of(app: &TestApp, id: homegrid_core::ProductId) -> i32 {
    app.store
        .product(id)
        .await
        .expect("query")
        .expect("product")
        .product
        .stock
}

#[tokio::test]
async fn completed_checkout_creates_order_once() {
    let fx = checkout_fixture(10).await;
    let body = checkout_completed_body("cs_1", "pi_1", fx.cart_id, fx.user_id, 5000);
    let header = sign_webhook(&body, Utc::now().timestamp());

    let resp = post_webhook(&fx.app, &body, &header).await;
    assert_eq!(resp.status(), 200);

    let order = fx
        .app
        .store
        .order_by_session("cs_1")
        .await
        .expect("query")
        .expect("order exists");
    assert_eq!(order.total_cents, 5000);
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(stock_of(&fx.app, fx.product_id).await, 8);

    // Cart is emptied
    let cart: Value = fx
        .app
        .client
        .get(fx.app.url("/cart"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(cart["cart"]["items"].as_array().expect("items").len(), 0);
}

#[tokio::test]
async fn duplicate_delivery_is_idempotent() {
    let fx = checkout_fixture(10).await;
    let body = checkout_completed_body("cs_1", "pi_1", fx.cart_id, fx.user_id, 5000);
    let header = sign_webhook(&body, Utc::now().timestamp());

    for _ in 0..2 {
        let resp = post_webhook(&fx.app, &body, &header).await;
        assert_eq!(resp.status(), 200, "duplicates are acknowledged");
    }

    // One order, one stock decrement
    assert_eq!(stock_of(&fx.app, fx.product_id).await, 8);
}

#[tokio::test]
async fn invalid_signature_mutates_nothing() {
    let fx = checkout_fixture(10).await;
    let body = checkout_completed_body("cs_1", "pi_1", fx.cart_id, fx.user_id, 5000);

    let resp = post_webhook(&fx.app, &body, "t=12345,v1=deadbeef").await;
    assert_eq!(resp.status(), 400);

    let tampered = body.replace("5000", "1");
    let header = sign_webhook(&body, Utc::now().timestamp());
    let resp = post_webhook(&fx.app, &tampered, &header).await;
    assert_eq!(resp.status(), 400);

    assert!(
        fx.app
            .store
            .order_by_session("cs_1")
            .await
            .expect("query")
            .is_none(),
        "no order materialized"
    );
    assert_eq!(stock_of(&fx.app, fx.product_id).await, 10);
}

#[tokio::test]
async fn stale_timestamp_is_rejected() {
    let fx = checkout_fixture(10).await;
    let body = checkout_completed_body("cs_1", "pi_1", fx.cart_id, fx.user_id, 5000);
    let header = sign_webhook(&body, Utc::now().timestamp() - 3600);

    let resp = post_webhook(&fx.app, &body, &header).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn insufficient_stock_conflicts_before_gateway() {
    let app = TestApp::spawn().await;
    let product = seed_product(&app.store, "SENSOR-1", 2500, 1).await;
    app.register("shopper@example.com", "hunter2hunter2").await;

    let resp = app
        .client
        .post(app.url("/cart/items"))
        .json(&json!({ "productId": product.id, "qty": 1 }))
        .send()
        .await
        .expect("add to cart");
    assert_eq!(resp.status(), 201);

    // Someone else bought the last unit
    app.store.set_stock(product.id, 0).await.expect("set stock");

    let resp = app
        .client
        .post(app.url("/checkout/session"))
        .send()
        .await
        .expect("create session");
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn empty_cart_cannot_check_out() {
    let app = TestApp::spawn().await;
    app.register("shopper@example.com", "hunter2hunter2").await;

    let resp = app
        .client
        .post(app.url("/checkout/session"))
        .send()
        .await
        .expect("create session");
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn failed_payment_cancels_the_order() {
    let fx = checkout_fixture(10).await;
    let body = checkout_completed_body("cs_1", "pi_1", fx.cart_id, fx.user_id, 5000);
    let header = sign_webhook(&body, Utc::now().timestamp());
    post_webhook(&fx.app, &body, &header).await;

    let body = json!({
        "type": "payment_intent.payment_failed",
        "data": { "object": { "id": "pi_1" } }
    })
    .to_string();
    let header = sign_webhook(&body, Utc::now().timestamp());
    let resp = post_webhook(&fx.app, &body, &header).await;
    assert_eq!(resp.status(), 200);

    let order = fx
        .app
        .store
        .order_by_session("cs_1")
        .await
        .expect("query")
        .expect("order");
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn unknown_event_types_are_acknowledged() {
    let fx = checkout_fixture(10).await;
    let body = json!({
        "type": "invoice.paid",
        "data": { "object": { "id": "in_1" } }
    })
    .to_string();
    let header = sign_webhook(&body, Utc::now().timestamp());

    let resp = post_webhook(&fx.app, &body, &header).await;
    assert_eq!(resp.status(), 200);
}
