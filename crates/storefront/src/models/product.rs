//! Product and category models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homegrid_core::catalog::CompatFlag;
use homegrid_core::{CategoryId, ProductId};

/// Per-product ecosystem/protocol compatibility flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    pub google: bool,
    pub alexa: bool,
    pub ha: bool,
    pub matter: bool,
    pub zigbee: bool,
    pub zwave: bool,
    pub thread: bool,
}

impl Compatibility {
    /// Whether the flag a shopper filtered on is set.
    #[must_use]
    pub const fn supports(&self, flag: CompatFlag) -> bool {
        match flag {
            CompatFlag::Google => self.google,
            CompatFlag::Alexa => self.alexa,
            CompatFlag::Ha => self.ha,
            CompatFlag::Matter => self.matter,
            CompatFlag::Zigbee => self.zigbee,
            CompatFlag::Zwave => self.zwave,
            CompatFlag::Thread => self.thread,
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    /// Stable external identifier, unique per catalog entry.
    pub sku: String,
    pub title: String,
    pub brand: String,
    pub short_desc: String,
    pub long_desc: String,
    /// Price in CAD minor units (cents).
    pub price_cad: i64,
    /// Price in USD minor units (cents).
    pub price_usd: i64,
    pub stock: i32,
    pub images: Vec<String>,
    /// Free-form protocol tag ("wifi", "zigbee", "zwave", "lutron", ...).
    pub protocol: String,
    pub power: Option<String>,
    pub room_tags: Vec<String>,
    pub beginner_friendly: bool,
    pub compat: Compatibility,
    /// Bridge/hub skus this product needs for full functionality.
    pub requires_bridge: Vec<String>,
    /// Shopper-visible only when true.
    pub published: bool,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product joined with its category name for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductWithCategory {
    pub product: Product,
    pub category_name: String,
}

/// One page of catalog results plus the unpaginated total.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    pub items: Vec<ProductWithCategory>,
    pub total: u64,
}

/// Fields for inserting or upserting a product (keyed by sku).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub title: String,
    pub brand: String,
    pub short_desc: String,
    pub long_desc: String,
    pub price_cad: i64,
    pub price_usd: i64,
    pub stock: i32,
    pub images: Vec<String>,
    pub protocol: String,
    pub power: Option<String>,
    pub room_tags: Vec<String>,
    pub beginner_friendly: bool,
    pub compat: Compatibility,
    pub requires_bridge: Vec<String>,
    pub published: bool,
    pub category_id: CategoryId,
}

/// Full product wire shape for catalog and detail responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub sku: String,
    pub title: String,
    pub brand: String,
    /// Category name, not id.
    pub category: String,
    pub short_desc: String,
    pub long_desc: String,
    pub price_cad: i64,
    pub price_usd: i64,
    pub stock: i32,
    pub images: Vec<String>,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    pub room_tags: Vec<String>,
    pub beginner_friendly: bool,
    pub compatibility: Compatibility,
    pub requires_bridge: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductWithCategory> for ProductView {
    fn from(row: ProductWithCategory) -> Self {
        let p = row.product;
        Self {
            id: p.id,
            sku: p.sku,
            title: p.title,
            brand: p.brand,
            category: row.category_name,
            short_desc: p.short_desc,
            long_desc: p.long_desc,
            price_cad: p.price_cad,
            price_usd: p.price_usd,
            stock: p.stock,
            images: p.images,
            protocol: p.protocol,
            power: p.power,
            room_tags: p.room_tags,
            beginner_friendly: p.beginner_friendly,
            compatibility: p.compat,
            requires_bridge: p.requires_bridge,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Trimmed wire shape for related-product strips.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedProductView {
    pub id: ProductId,
    pub sku: String,
    pub title: String,
    pub brand: String,
    pub price_cad: i64,
    pub price_usd: i64,
    pub images: Vec<String>,
    pub compatibility: Compatibility,
}

impl From<&Product> for RelatedProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            sku: p.sku.clone(),
            title: p.title.clone(),
            brand: p.brand.clone(),
            price_cad: p.price_cad,
            price_usd: p.price_usd,
            images: p.images.clone(),
            compatibility: p.compat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_product(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            sku: format!("SKU-{id:03}"),
            title: "Hue A19 Colour Bulb".to_owned(),
            brand: "Philips Hue".to_owned(),
            short_desc: "Colour-changing smart bulb".to_owned(),
            long_desc: "A 1100-lumen colour bulb".to_owned(),
            price_cad: 4999,
            price_usd: 3999,
            stock: 12,
            images: vec!["/images/hue-a19.jpg".to_owned()],
            protocol: "zigbee".to_owned(),
            power: Some("9W".to_owned()),
            room_tags: vec!["living-room".to_owned()],
            beginner_friendly: true,
            compat: Compatibility {
                google: true,
                alexa: true,
                ha: true,
                zigbee: true,
                ..Compatibility::default()
            },
            requires_bridge: vec!["PHILIPS-HUE-BRIDGE-001".to_owned()],
            published: true,
            category_id: CategoryId::new(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_regroups_compatibility_and_category() {
        let view = ProductView::from(ProductWithCategory {
            product: sample_product(1),
            category_name: "Lighting".to_owned(),
        });
        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["category"], "Lighting");
        assert_eq!(json["compatibility"]["zigbee"], true);
        assert_eq!(json["compatibility"]["matter"], false);
        assert_eq!(json["priceCad"], 4999);
        // no flat worksZigbee-style keys on the wire
        assert!(json.get("worksZigbee").is_none());
    }

    #[test]
    fn test_compat_supports() {
        let compat = Compatibility {
            thread: true,
            ..Compatibility::default()
        };
        assert!(compat.supports(CompatFlag::Thread));
        assert!(!compat.supports(CompatFlag::Google));
    }
}
