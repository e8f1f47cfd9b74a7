//! Catalog listing and product detail tests.

use homegrid_integration_tests::{TestApp, sample_product};
use homegrid_storefront::store::Store;
use serde_json::Value;

async fn seed_catalog(app: &TestApp) {
    let lighting = app
        .store
        .upsert_category("Lighting", None, None)
        .await
        .expect("category");
    let sensors = app
        .store
        .upsert_category("Sensors", None, None)
        .await
        .expect("category");

    let mut bulb = sample_product("BULB-1", lighting, 2999, 10);
    bulb.title = "Hue Colour Bulb".to_owned();
    bulb.brand = "Philips".to_owned();
    bulb.short_desc = "A colour-changing smart bulb".to_owned();
    bulb.long_desc = "A colour-changing smart bulb with millions of colours".to_owned();
    bulb.protocol = "wifi".to_owned();
    bulb.room_tags = vec!["living-room".to_owned()];
    app.store.upsert_product(bulb).await.expect("product");

    let mut motion = sample_product("MOTION-1", sensors, 3499, 5);
    motion.title = "Motion Sensor".to_owned();
    app.store.upsert_product(motion).await.expect("product");

    let mut door = sample_product("DOOR-1", sensors, 2299, 5);
    door.title = "Door Sensor".to_owned();
    door.compat.google = false;
    app.store.upsert_product(door).await.expect("product");

    let mut hidden = sample_product("HIDDEN-1", sensors, 999, 5);
    hidden.published = false;
    app.store.upsert_product(hidden).await.expect("product");
}

async fn get_json(app: &TestApp, path: &str) -> Value {
    let resp = app
        .client
        .get(app.url(path))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200, "GET {path}");
    resp.json().await.expect("json body")
}

fn titles(body: &Value) -> Vec<&str> {
    body["products"]
        .as_array()
        .expect("products array")
        .iter()
        .map(|p| p["title"].as_str().expect("title"))
        .collect()
}

#[tokio::test]
async fn listing_excludes_unpublished() {
    let app = TestApp::spawn().await;
    seed_catalog(&app).await;

    let body = get_json(&app, "/catalog").await;
    assert_eq!(body["pagination"]["total"], 3);
    assert!(!titles(&body).iter().any(|t| t.contains("HIDDEN")));
}

#[tokio::test]
async fn text_and_price_filters_conform() {
    let app = TestApp::spawn().await;
    seed_catalog(&app).await;

    let body = get_json(&app, "/catalog?q=sensor").await;
    assert_eq!(body["pagination"]["total"], 2);

    // price bounds arrive in whole dollars
    let body = get_json(&app, "/catalog?price_min=23&price_max=30").await;
    for product in body["products"].as_array().expect("products") {
        let price = product["priceCad"].as_i64().expect("priceCad");
        assert!((2300..=3000).contains(&price), "price {price} out of bounds");
    }
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn compatibility_room_and_protocol_filters() {
    let app = TestApp::spawn().await;
    seed_catalog(&app).await;

    let body = get_json(&app, "/catalog?works=google").await;
    assert_eq!(body["pagination"]["total"], 2);
    for product in body["products"].as_array().expect("products") {
        assert_eq!(product["compatibility"]["google"], true);
    }

    let body = get_json(&app, "/catalog?room=living-room").await;
    assert_eq!(titles(&body), ["Hue Colour Bulb"]);

    let body = get_json(&app, "/catalog?protocol=zigbee").await;
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn sort_and_pagination() {
    let app = TestApp::spawn().await;
    seed_catalog(&app).await;

    let body = get_json(&app, "/catalog?sort=price_asc").await;
    let prices: Vec<i64> = body["products"]
        .as_array()
        .expect("products")
        .iter()
        .map(|p| p["priceCad"].as_i64().expect("price"))
        .collect();
    assert_eq!(prices, [2299, 2999, 3499]);

    let body = get_json(&app, "/catalog?sort=price_asc&limit=2&page=2").await;
    assert_eq!(body["pagination"]["pages"], 2);
    assert_eq!(titles(&body).len(), 1);
    assert_eq!(body["products"][0]["priceCad"], 3499);
}

#[tokio::test]
async fn product_detail_with_related() {
    let app = TestApp::spawn().await;
    seed_catalog(&app).await;

    let listing = get_json(&app, "/catalog?q=motion").await;
    let id = listing["products"][0]["id"].as_i64().expect("id");

    let body = get_json(&app, &format!("/products/{id}")).await;
    assert_eq!(body["product"]["title"], "Motion Sensor");
    // Same-category sibling, not the unpublished one
    let related = body["relatedProducts"].as_array().expect("related");
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["title"], "Door Sensor");
}

#[tokio::test]
async fn unknown_product_is_404() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .get(app.url("/products/9999"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 404);
}
