//! Kit bundle, editorial content and health endpoint tests.

use homegrid_core::{ContentType, Ecosystem, SkillLevel};
use homegrid_integration_tests::{TestApp, seed_product};
use homegrid_storefront::store::{NewContent, NewKit, Store};
use serde_json::{Value, json};

async fn seed_kit(app: &TestApp, slug: &str, published: bool) {
    let product = seed_product(&app.store, &format!("KIT-{slug}"), 2500, 10).await;
    app.store
        .upsert_kit(NewKit {
            slug: slug.to_owned(),
            title: format!("Kit {slug}"),
            ecosystem: Ecosystem::Google,
            price_cad: 9999,
            price_usd: 7999,
            skill_level: SkillLevel::Beginner,
            includes: json!(["One sensor"]),
            faq: json!([]),
            published,
            items: vec![(product.id, 2)],
        })
        .await
        .expect("upsert kit");
}

#[tokio::test]
async fn only_published_kits_are_listed() {
    let app = TestApp::spawn().await;
    seed_kit(&app, "starter", true).await;
    seed_kit(&app, "draft", false).await;

    let body: Value = app
        .client
        .get(app.url("/kits"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    let kits = body["kits"].as_array().expect("kits");
    assert_eq!(kits.len(), 1);
    assert_eq!(kits[0]["slug"], "starter");
}

#[tokio::test]
async fn kit_detail_includes_items() {
    let app = TestApp::spawn().await;
    seed_kit(&app, "starter", true).await;

    let resp = app
        .client
        .get(app.url("/kits/starter"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body["kit"]["title"], "Kit starter");
    let items = body["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["qty"], 2);

    let resp = app
        .client
        .get(app.url("/kits/draft"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 404, "unpublished kits are invisible");
}

#[tokio::test]
async fn content_filters_by_type() {
    let app = TestApp::spawn().await;
    for (slug, content_type) in [("first-steps", ContentType::Guide), ("news", ContentType::Blog)]
    {
        app.store
            .upsert_content(NewContent {
                slug: slug.to_owned(),
                content_type,
                title: slug.to_owned(),
                body: json!([]),
                seo_title: None,
                seo_description: None,
                published: true,
            })
            .await
            .expect("upsert content");
    }

    let body: Value = app
        .client
        .get(app.url("/content?type=GUIDE"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    let content = body["content"].as_array().expect("content");
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["slug"], "first-steps");

    let resp = app
        .client
        .get(app.url("/content?type=PODCAST"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);

    let resp = app
        .client
        .get(app.url("/content/first-steps"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body["status"], "ok");
}
