//! Curated kit bundles.

use chrono::{DateTime, Utc};
use serde::Serialize;

use homegrid_core::{Ecosystem, KitId, ProductId, SkillLevel};

use super::product::Product;

/// A curated product bundle for one ecosystem and skill level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kit {
    pub id: KitId,
    pub slug: String,
    pub title: String,
    pub ecosystem: Ecosystem,
    pub price_cad: i64,
    pub price_usd: i64,
    pub skill_level: SkillLevel,
    /// Free-form "what's in the box" structured content.
    pub includes: serde_json::Value,
    /// Free-form FAQ structured content.
    pub faq: serde_json::Value,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// Ordered (product, quantity) association within a kit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitItem {
    pub kit_id: KitId,
    pub product_id: ProductId,
    pub qty: i32,
    pub position: i32,
}

/// A kit item joined with its product.
#[derive(Debug, Clone, PartialEq)]
pub struct KitItemWithProduct {
    pub item: KitItem,
    pub product: Product,
}

/// A kit with its ordered contents.
#[derive(Debug, Clone, PartialEq)]
pub struct KitDetail {
    pub kit: Kit,
    pub items: Vec<KitItemWithProduct>,
}
