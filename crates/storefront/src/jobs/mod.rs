//! Catalog maintenance jobs.
//!
//! A run is a sequence of individually failable steps; one step erroring is
//! recorded in the report and the run continues. Randomized drift (stock
//! walks, availability flips, price perturbation) only happens when
//! `JobSettings::simulate` is on, so scheduled runs are deterministic
//! against the reference catalog by default.

pub mod reference;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::JobSettings;
use crate::store::{Store, StoreError};

/// Which maintenance pass to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Refresh prices from the reference base prices.
    Prices,
    /// Stock walk (simulate only).
    Stock,
    /// Availability flips (simulate only).
    Availability,
    /// Everything: categories, products, prices, stock, discovery,
    /// availability, and a stats snapshot.
    Full,
}

impl FromStr for UpdateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prices" => Ok(Self::Prices),
            "stock" => Ok(Self::Stock),
            "availability" => Ok(Self::Availability),
            "full" => Ok(Self::Full),
            other => Err(format!("invalid update type: {other}")),
        }
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Prices => "prices",
            Self::Stock => "stock",
            Self::Availability => "availability",
            Self::Full => "full",
        })
    }
}

/// Outcome of one step of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step: &'static str,
    /// Rows the step touched.
    pub updated: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a whole run, returned to the admin caller and logged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub update_type: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub steps: Vec<StepReport>,
    pub errors: Vec<String>,
}

impl RunReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs maintenance passes against a store.
pub struct JobRunner<'a, S> {
    store: &'a S,
    settings: JobSettings,
}

impl<'a, S: Store> JobRunner<'a, S> {
    pub const fn new(store: &'a S, settings: JobSettings) -> Self {
        Self { store, settings }
    }

    /// Run a maintenance pass and report per-step outcomes.
    pub async fn run(&self, kind: UpdateKind) -> RunReport {
        let started_at = Utc::now();
        info!(update_type = %kind, "Starting maintenance run");

        let mut steps = Vec::new();
        match kind {
            UpdateKind::Prices => {
                self.step(&mut steps, "refresh_prices", self.refresh_prices()).await;
            }
            UpdateKind::Stock => {
                self.step(&mut steps, "adjust_stock", self.adjust_stock()).await;
            }
            UpdateKind::Availability => {
                self.step(&mut steps, "flip_availability", self.flip_availability()).await;
            }
            UpdateKind::Full => {
                self.step(&mut steps, "refresh_categories", self.refresh_categories()).await;
                self.step(&mut steps, "refresh_products", self.refresh_products()).await;
                self.step(&mut steps, "refresh_prices", self.refresh_prices()).await;
                self.step(&mut steps, "adjust_stock", self.adjust_stock()).await;
                self.step(&mut steps, "discover_new_products", self.discover_new_products()).await;
                self.step(&mut steps, "flip_availability", self.flip_availability()).await;
                self.step(&mut steps, "snapshot_stats", self.snapshot_stats()).await;
            }
        }

        let finished_at = Utc::now();
        let errors: Vec<String> = steps
            .iter()
            .filter_map(|s| s.error.as_ref().map(|e| format!("{}: {e}", s.step)))
            .collect();
        let report = RunReport {
            update_type: kind.to_string(),
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds(),
            steps,
            errors,
        };
        info!(
            update_type = %kind,
            duration_ms = report.duration_ms,
            errors = report.errors.len(),
            "Maintenance run finished"
        );
        report
    }

    async fn step(
        &self,
        steps: &mut Vec<StepReport>,
        name: &'static str,
        fut: impl Future<Output = Result<u64, StoreError>>,
    ) {
        match fut.await {
            Ok(updated) => {
                info!(step = name, updated, "Step completed");
                steps.push(StepReport {
                    step: name,
                    updated,
                    error: None,
                });
            }
            Err(e) => {
                warn!(step = name, error = %e, "Step failed, continuing");
                steps.push(StepReport {
                    step: name,
                    updated: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    /// Upsert the reference category tree.
    async fn refresh_categories(&self) -> Result<u64, StoreError> {
        let mut updated = 0;
        for category in reference::CATEGORIES {
            self.store
                .upsert_category(category.name, category.parent, Some(category.description))
                .await?;
            updated += 1;
        }
        Ok(updated)
    }

    /// Upsert the core reference product set by sku.
    async fn refresh_products(&self) -> Result<u64, StoreError> {
        let mut updated = 0;
        for product in reference::PRODUCTS {
            let category_id = self
                .store
                .upsert_category(product.category, category_parent(product.category), None)
                .await?;
            self.store
                .upsert_product(product.to_new_product(category_id))
                .await?;
            updated += 1;
        }
        Ok(updated)
    }

    /// Reset prices to the reference base, perturbed ±10% when simulating.
    /// Products with no reference entry are left untouched.
    async fn refresh_prices(&self) -> Result<u64, StoreError> {
        let mut updated = 0;
        for product in self.store.all_products().await? {
            let Some((base_cad, base_usd)) = reference::base_prices(&product.sku) else {
                continue;
            };
            let (cad, usd) = if self.settings.simulate {
                // rng stays scoped to the statement so the future stays Send
                let variation: f64 = rand::rng().random_range(-0.10..=0.10);
                (perturb(base_cad, variation), perturb(base_usd, variation))
            } else {
                (base_cad, base_usd)
            };
            self.store
                .update_product_prices(product.id, cad, usd)
                .await?;
            updated += 1;
        }
        Ok(updated)
    }

    /// Random walk of stock levels (-5..=+5, floored at zero).
    async fn adjust_stock(&self) -> Result<u64, StoreError> {
        if !self.settings.simulate {
            return Ok(0);
        }
        let mut updated = 0;
        for product in self.store.all_products().await? {
            if !product.published {
                continue;
            }
            let change: i32 = rand::rng().random_range(-5..=5);
            if change == 0 {
                continue;
            }
            let new_stock = (product.stock + change).max(0);
            if new_stock != product.stock {
                self.store.set_stock(product.id, new_stock).await?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// 5% chance per published product of going unavailable.
    async fn flip_availability(&self) -> Result<u64, StoreError> {
        if !self.settings.simulate {
            return Ok(0);
        }
        let mut updated = 0;
        for product in self.store.all_products().await? {
            if product.published && rand::rng().random_bool(0.05) {
                self.store.set_published(product.id, false).await?;
                warn!(sku = %product.sku, "Product temporarily unavailable");
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Add discovery-set products we do not carry yet.
    async fn discover_new_products(&self) -> Result<u64, StoreError> {
        let mut added = 0;
        for product in reference::DISCOVERY {
            if self.store.product_by_sku(product.sku).await?.is_some() {
                continue;
            }
            let category_id = self
                .store
                .upsert_category(product.category, category_parent(product.category), None)
                .await?;
            self.store
                .upsert_product(product.to_new_product(category_id))
                .await?;
            info!(sku = product.sku, "Discovered new product");
            added += 1;
        }
        Ok(added)
    }

    /// Log a catalog snapshot; the count returned is published products.
    async fn snapshot_stats(&self) -> Result<u64, StoreError> {
        let stats = self.store.catalog_stats().await?;
        info!(
            products = stats.products,
            published = stats.published,
            categories = stats.categories,
            orders = stats.orders,
            low_stock = stats.low_stock,
            out_of_stock = stats.out_of_stock,
            avg_price_cad = stats.avg_price_cad,
            "Catalog snapshot"
        );
        Ok(stats.published)
    }
}

fn category_parent(name: &str) -> Option<&'static str> {
    reference::CATEGORIES
        .iter()
        .find(|c| c.name == name)
        .and_then(|c| c.parent)
}

#[allow(clippy::cast_possible_truncation)]
fn perturb(base: i64, variation: f64) -> i64 {
    #[allow(clippy::cast_precision_loss)]
    let adjusted = (base as f64 * (1.0 + variation)).round();
    adjusted as i64
}
