//! Database seeding command.
//!
//! Runs the full maintenance pass to populate categories and products from
//! the reference data, then adds a starter kit and a getting-started guide
//! so a fresh install has something to show.

use serde_json::json;
use tracing::info;

use homegrid_core::{ContentType, Ecosystem, SkillLevel};
use homegrid_storefront::config::JobSettings;
use homegrid_storefront::jobs::{JobRunner, UpdateKind};
use homegrid_storefront::store::{NewContent, NewKit, PgStore, Store};

/// Skus bundled into the starter kit, with quantities, in display order.
const STARTER_KIT_SKUS: [(&str, i32); 4] = [
    ("GOOGLE-NEST-MINI-001", 1),
    ("PHILIPS-HUE-BRIDGE-001", 1),
    ("PHILIPS-HUE-A19-COLOR-001", 2),
    ("AQARA-MOTION-SENSOR-001", 1),
];

/// Seed the database with the reference catalog, a kit and a guide.
///
/// Idempotent: products upsert by sku, kits and content by slug.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a write fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let store = PgStore::new(pool);

    info!("Seeding catalog from reference data...");
    let report = JobRunner::new(&store, JobSettings::default())
        .run(UpdateKind::Full)
        .await;
    if !report.succeeded() {
        return Err(format!("catalog seed failed: {}", report.errors.join("; ")).into());
    }

    let mut items = Vec::new();
    for (sku, qty) in STARTER_KIT_SKUS {
        let product = store
            .product_by_sku(sku)
            .await?
            .ok_or_else(|| format!("seed product missing: {sku}"))?;
        items.push((product.id, qty));
    }

    store
        .upsert_kit(NewKit {
            slug: "google-starter".to_owned(),
            title: "Google Home Starter Kit".to_owned(),
            ecosystem: Ecosystem::Google,
            price_cad: 27999,
            price_usd: 21999,
            skill_level: SkillLevel::Beginner,
            includes: json!([
                "Google Nest Mini smart speaker",
                "Philips Hue Bridge",
                "2x Philips Hue colour bulbs",
                "Aqara motion sensor",
            ]),
            faq: json!([
                {
                    "q": "Do I need anything else?",
                    "a": "A WiFi network and a free outlet for the bridge."
                },
            ]),
            published: true,
            items,
        })
        .await?;
    info!("Seeded starter kit");

    store
        .upsert_content(NewContent {
            slug: "getting-started".to_owned(),
            content_type: ContentType::Guide,
            title: "Getting Started with Your Smart Home".to_owned(),
            body: json!([
                { "type": "paragraph", "text": "Start with one room and one ecosystem." },
                { "type": "paragraph", "text": "A hub-based setup keeps automations local and fast." },
            ]),
            seo_title: Some("Smart Home Getting Started Guide".to_owned()),
            seo_description: Some(
                "How to pick an ecosystem and set up your first smart home devices.".to_owned(),
            ),
            published: true,
        })
        .await?;
    info!("Seeded starter guide");

    Ok(())
}
