//! Normalized catalog filter/sort/pagination model.
//!
//! Shoppers send an unordered set of optional query parameters; this module
//! turns them into a [`CatalogQuery`] that store backends execute. Parsing
//! is lenient the way the storefront has always been: unrecognized `works`
//! values, malformed numbers and unknown sort keys degrade to no-op filters
//! or defaults rather than erroring the request.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;

/// Default page size for catalog listings.
pub const DEFAULT_LIMIT: u32 = 20;

/// Raw catalog query parameters as received on the wire.
///
/// Everything is optional and stringly-typed; [`CatalogQuery::from_params`]
/// performs the normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub protocol: Option<String>,
    pub works: Option<String>,
    pub room: Option<String>,
    pub beginner: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Ecosystem/protocol compatibility dimensions a shopper can filter on.
///
/// Maps to the per-product boolean compatibility flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatFlag {
    Google,
    Alexa,
    Ha,
    Matter,
    Zigbee,
    Zwave,
    Thread,
}

impl CompatFlag {
    /// Parse a `works` parameter value. Unrecognized values return `None`,
    /// which callers treat as a no-op filter rather than an error.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "google" => Some(Self::Google),
            "alexa" => Some(Self::Alexa),
            "ha" => Some(Self::Ha),
            "matter" => Some(Self::Matter),
            "zigbee" => Some(Self::Zigbee),
            "zwave" => Some(Self::Zwave),
            "thread" => Some(Self::Thread),
            _ => None,
        }
    }
}

/// Catalog sort order. Unknown values fall back to `CreatedDesc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first (default).
    #[default]
    CreatedDesc,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    fn parse(value: &str) -> Self {
        match value {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "name_asc" => Self::NameAsc,
            "name_desc" => Self::NameDesc,
            _ => Self::CreatedDesc,
        }
    }
}

/// Normalized catalog query executed by store backends.
///
/// Every query implicitly restricts to `published = true`; backends add the
/// product id as a secondary sort key so pages are stable under ties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogQuery {
    /// Case-insensitive substring matched against title, short/long
    /// description and brand (OR-combined).
    pub text: Option<String>,
    pub category: Option<CategoryId>,
    /// Inclusive lower bound on `price_cad`, minor units.
    pub price_min_cents: Option<i64>,
    /// Inclusive upper bound on `price_cad`, minor units.
    pub price_max_cents: Option<i64>,
    /// Exact match on the protocol tag.
    pub protocol: Option<String>,
    pub works: Option<CompatFlag>,
    /// Membership test against the room-tag set.
    pub room: Option<String>,
    pub beginner_only: bool,
    pub sort: SortKey,
    /// 1-indexed page number.
    pub page: u32,
    pub limit: u32,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

fn parse_or<T: std::str::FromStr>(value: Option<&String>) -> Option<T> {
    value.and_then(|s| s.trim().parse().ok())
}

impl CatalogQuery {
    /// Normalize raw wire parameters.
    ///
    /// Price bounds arrive in whole currency units and are converted to
    /// minor units (x 100). `beginner` restricts only on the literal string
    /// `"true"`. Malformed numeric parameters are ignored.
    #[must_use]
    pub fn from_params(params: CatalogParams) -> Self {
        let page = parse_or::<u32>(params.page.as_ref()).map_or(1, |p| p.max(1));
        let limit = parse_or::<u32>(params.limit.as_ref())
            .map_or(DEFAULT_LIMIT, |l| l.max(1));

        Self {
            text: non_empty(params.q),
            category: parse_or::<i32>(params.category.as_ref()).map(CategoryId::new),
            price_min_cents: parse_or::<i64>(params.price_min.as_ref()).map(|v| v * 100),
            price_max_cents: parse_or::<i64>(params.price_max.as_ref()).map(|v| v * 100),
            protocol: non_empty(params.protocol),
            works: params.works.as_deref().and_then(CompatFlag::parse),
            room: non_empty(params.room),
            beginner_only: params.beginner.as_deref() == Some("true"),
            sort: params.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
            page,
            limit,
        }
    }

    /// Row offset for the current page.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Total page count for a result set: `ceil(total / limit)`.
    #[must_use]
    pub const fn pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> CatalogParams {
        let mut p = CatalogParams::default();
        for (key, value) in pairs {
            let value = Some((*value).to_owned());
            match *key {
                "q" => p.q = value,
                "category" => p.category = value,
                "price_min" => p.price_min = value,
                "price_max" => p.price_max = value,
                "protocol" => p.protocol = value,
                "works" => p.works = value,
                "room" => p.room = value,
                "beginner" => p.beginner = value,
                "sort" => p.sort = value,
                "page" => p.page = value,
                "limit" => p.limit = value,
                _ => unreachable!(),
            }
        }
        p
    }

    #[test]
    fn test_defaults() {
        let q = CatalogQuery::from_params(CatalogParams::default());
        assert_eq!(q, CatalogQuery {
            page: 1,
            limit: DEFAULT_LIMIT,
            ..CatalogQuery::default()
        });
        assert_eq!(q.sort, SortKey::CreatedDesc);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_price_bounds_in_minor_units() {
        let q = CatalogQuery::from_params(params(&[("price_min", "25"), ("price_max", "100")]));
        assert_eq!(q.price_min_cents, Some(2500));
        assert_eq!(q.price_max_cents, Some(10000));
    }

    #[test]
    fn test_unrecognized_works_is_noop() {
        let q = CatalogQuery::from_params(params(&[("works", "homekit")]));
        assert_eq!(q.works, None);
        assert_eq!(CompatFlag::parse("ZigBee"), Some(CompatFlag::Zigbee));
    }

    #[test]
    fn test_beginner_literal_true_only() {
        assert!(CatalogQuery::from_params(params(&[("beginner", "true")])).beginner_only);
        assert!(!CatalogQuery::from_params(params(&[("beginner", "1")])).beginner_only);
        assert!(!CatalogQuery::from_params(params(&[("beginner", "TRUE")])).beginner_only);
    }

    #[test]
    fn test_unknown_sort_falls_back() {
        let q = CatalogQuery::from_params(params(&[("sort", "relevance")]));
        assert_eq!(q.sort, SortKey::CreatedDesc);
        let q = CatalogQuery::from_params(params(&[("sort", "price_desc")]));
        assert_eq!(q.sort, SortKey::PriceDesc);
    }

    #[test]
    fn test_pagination_normalization() {
        let q = CatalogQuery::from_params(params(&[("page", "3"), ("limit", "10")]));
        assert_eq!(q.offset(), 20);
        assert_eq!(q.pages(25), 3);
        assert_eq!(q.pages(0), 0);

        // Garbage and zero values degrade to sane defaults.
        let q = CatalogQuery::from_params(params(&[("page", "zero"), ("limit", "0")]));
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 1);
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let q = CatalogQuery::from_params(params(&[("q", "   ")]));
        assert_eq!(q.text, None);
        let q = CatalogQuery::from_params(params(&[("q", " dimmer ")]));
        assert_eq!(q.text.as_deref(), Some("dimmer"));
    }
}
