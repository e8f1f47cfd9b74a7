//! Booking and proposal pricing tests.

use chrono::{Duration, Utc};
use homegrid_core::UserRole;
use homegrid_integration_tests::TestApp;
use homegrid_storefront::store::Store;
use serde_json::{Value, json};

async fn book_slot(app: &TestApp) -> i64 {
    let resp = app
        .client
        .post(app.url("/bookings"))
        .json(&json!({
            "scheduledAt": Utc::now() + Duration::days(7),
            "notes": "Two-bedroom condo",
        }))
        .send()
        .await
        .expect("booking request");
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("json");
    body["booking"]["id"].as_i64().expect("booking id")
}

#[tokio::test]
async fn proposal_prices_the_bom() {
    let app = TestApp::spawn().await;
    app.register("client@example.com", "hunter2hunter2").await;
    let booking_id = book_slot(&app).await;

    let resp = app
        .client
        .post(app.url("/proposals"))
        .json(&json!({
            "bookingId": booking_id,
            "bom": [
                { "name": "Smart bulb", "price": 2500, "quantity": 1 },
            ],
            "laborHoursEst": 4.0,
        }))
        .send()
        .await
        .expect("proposal request");
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("json");

    let proposal = &body["proposal"];
    assert_eq!(proposal["status"], "DRAFT");
    assert_eq!(proposal["priceRange"]["min"], 2250);
    assert_eq!(proposal["priceRange"]["max"], 2750);
    assert_eq!(proposal["priceRange"]["labor"], 30000);
}

#[tokio::test]
async fn proposals_list_is_own_and_newest_first() {
    let app = TestApp::spawn().await;
    app.register("client@example.com", "hunter2hunter2").await;
    let booking_id = book_slot(&app).await;

    for name in ["First", "Second"] {
        let resp = app
            .client
            .post(app.url("/proposals"))
            .json(&json!({
                "bookingId": booking_id,
                "bom": [{ "name": name, "price": 1000, "quantity": 1 }],
            }))
            .send()
            .await
            .expect("proposal request");
        assert_eq!(resp.status(), 201);
    }

    let body: Value = app
        .client
        .get(app.url("/proposals"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    let proposals = body["proposals"].as_array().expect("proposals");
    assert_eq!(proposals.len(), 2);
    assert_eq!(proposals[0]["bom"][0]["name"], "Second");
}

#[tokio::test]
async fn someone_elses_booking_is_404() {
    let app = TestApp::spawn().await;

    // Another user's booking, created out of band
    let other = app
        .store
        .create_user("other@example.com", "not-a-real-hash", UserRole::Customer)
        .await
        .expect("create user");
    let booking = app
        .store
        .create_booking(other.id, Utc::now() + Duration::days(3), None)
        .await
        .expect("create booking");

    app.register("client@example.com", "hunter2hunter2").await;
    let resp = app
        .client
        .post(app.url("/proposals"))
        .json(&json!({
            "bookingId": booking.id,
            "bom": [{ "name": "Smart bulb", "price": 1000, "quantity": 1 }],
        }))
        .send()
        .await
        .expect("proposal request");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = TestApp::spawn().await;
    app.register("client@example.com", "hunter2hunter2").await;
    let booking_id = book_slot(&app).await;

    let resp = app
        .client
        .post(app.url("/proposals"))
        .json(&json!({
            "bookingId": booking_id,
            "bom": [{ "name": "Refund line", "price": -500, "quantity": 1 }],
        }))
        .send()
        .await
        .expect("proposal request");
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn past_booking_time_is_rejected() {
    let app = TestApp::spawn().await;
    app.register("client@example.com", "hunter2hunter2").await;

    let resp = app
        .client
        .post(app.url("/bookings"))
        .json(&json!({ "scheduledAt": Utc::now() - Duration::hours(1) }))
        .send()
        .await
        .expect("booking request");
    assert_eq!(resp.status(), 400);
}
