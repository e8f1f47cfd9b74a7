//! AI recommendation and content generation endpoint tests.

use homegrid_integration_tests::{
    ADMIN_KEY, CannedGenerator, FailingGenerator, TestApp, seed_product,
};
use serde_json::{Value, json};

#[tokio::test]
async fn unparseable_model_output_falls_back_to_keywords() {
    let app = TestApp::spawn().await;
    seed_product(&app.store, "SENSOR-1", 2500, 10).await;

    let resp = app
        .client
        .post(app.url("/ai/recommendations"))
        .json(&json!({ "query": "sensor" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json");

    let recommendations = body["recommendations"].as_array().expect("array");
    assert!(!recommendations.is_empty(), "fallback still answers");
    assert!(
        recommendations[0]["reason"]
            .as_str()
            .expect("reason")
            .contains("sensor"),
        "fallback reason is templated from the query"
    );
    assert_eq!(body["query"], "sensor");
}

#[tokio::test]
async fn valid_model_output_is_passed_through() {
    let canned = json!([{
        "productId": 1,
        "title": "Product SENSOR-1",
        "brand": "Aqara",
        "price": 2500,
        "reason": "Matches your request",
        "benefits": "Local control",
        "considerations": "None",
    }])
    .to_string();
    let app = TestApp::spawn_with_generator(CannedGenerator(canned)).await;
    seed_product(&app.store, "SENSOR-1", 2500, 10).await;

    let body: Value = app
        .client
        .post(app.url("/ai/recommendations"))
        .json(&json!({ "query": "anything" }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["recommendations"][0]["reason"], "Matches your request");
}

#[tokio::test]
async fn generator_outage_falls_back_to_keywords() {
    let app = TestApp::spawn_with_generator(FailingGenerator).await;
    seed_product(&app.store, "SENSOR-1", 2500, 10).await;

    let resp = app
        .client
        .post(app.url("/ai/recommendations"))
        .json(&json!({ "query": "sensor" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200, "outage never surfaces to the shopper");
    let body: Value = resp.json().await.expect("json");

    let recommendations = body["recommendations"].as_array().expect("array");
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["title"], "Product SENSOR-1");
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/ai/recommendations"))
        .json(&json!({ "query": "  " }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn content_generation_is_admin_gated() {
    let app = TestApp::spawn_with_generator(CannedGenerator("A draft guide.".to_owned())).await;
    let body = json!({ "type": "guide", "topic": "smart lighting" });

    let resp = app
        .client
        .post(app.url("/ai/generate-content"))
        .json(&body)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);

    // The shared key alone is not enough either.
    let resp = app
        .client
        .post(app.url("/ai/generate-content"))
        .header("x-admin-key", ADMIN_KEY)
        .json(&body)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);

    app.login_admin("admin@example.com", "hunter2hunter2").await;
    let resp = app
        .client
        .post(app.url("/ai/generate-content"))
        .header("x-admin-key", ADMIN_KEY)
        .json(&body)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body["content"], "A draft guide.");
    assert_eq!(body["type"], "guide");
}

#[tokio::test]
async fn unknown_content_type_is_rejected() {
    let app = TestApp::spawn().await;
    app.login_admin("admin@example.com", "hunter2hunter2").await;

    let resp = app
        .client
        .post(app.url("/ai/generate-content"))
        .header("x-admin-key", ADMIN_KEY)
        .json(&json!({ "type": "press_release", "topic": "anything" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 422, "serde rejects the unknown kind");
}
