//! Proposal pricing calculator.
//!
//! Turns a bill-of-materials (priced line items in integer cents) plus an
//! optional labor-hour estimate into a quoted price range:
//!
//! ```text
//! subtotal    = sum(price_i * quantity_i)
//! labor       = round(labor_hours * 7500)    // $75.00/hr in cents
//! range.min   = round(subtotal * 0.9)        // 10% discount floor
//! range.max   = round(subtotal * 1.1)        // 10% markup ceiling
//! total       = subtotal + labor             // range covers products only
//! ```
//!
//! Rounding is `f64::round` (round-half-away-from-zero); ties are not
//! exercised by realistic inputs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Labor rate in cents per hour.
pub const LABOR_RATE_CENTS: i64 = 7500;

/// Discount applied to the subtotal for the low end of the range.
const RANGE_FLOOR: f64 = 0.9;

/// Markup applied to the subtotal for the high end of the range.
const RANGE_CEILING: f64 = 1.1;

/// One line of a proposal's bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price in minor currency units (cents).
    pub price: i64,
    pub quantity: u32,
    #[serde(default)]
    pub category: Option<String>,
}

/// Derived price range for a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Low end of the product cost, cents.
    pub min: i64,
    /// High end of the product cost, cents.
    pub max: i64,
    /// Estimated labor cost, cents.
    pub labor: i64,
}

/// Full pricing result for a bill of materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Sum of all line totals, cents.
    pub subtotal: i64,
    pub range: PriceRange,
    /// Subtotal plus labor, cents. Not bounded by `range.min`/`range.max`.
    pub total_with_labor: i64,
}

/// Validation errors for a bill of materials.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line item carries a negative unit price.
    #[error("line {index} ({name}): negative price {price}")]
    NegativePrice {
        index: usize,
        name: String,
        price: i64,
    },
    /// A negative labor estimate was supplied.
    #[error("negative labor hours estimate: {0}")]
    NegativeLabor(f64),
}

/// Compute the price range for a bill of materials.
///
/// An empty bill of materials quotes to all zeros. Negative prices and
/// negative labor estimates are rejected; the upstream system let them
/// through unchecked, which produced nonsense quotes.
///
/// # Errors
///
/// Returns [`PricingError`] if any line has a negative price or the labor
/// estimate is negative.
pub fn quote(bom: &[BomLine], labor_hours: Option<f64>) -> Result<Quote, PricingError> {
    for (index, line) in bom.iter().enumerate() {
        if line.price < 0 {
            return Err(PricingError::NegativePrice {
                index,
                name: line.name.clone(),
                price: line.price,
            });
        }
    }

    let hours = labor_hours.unwrap_or(0.0);
    if hours < 0.0 {
        return Err(PricingError::NegativeLabor(hours));
    }

    let subtotal: i64 = bom
        .iter()
        .map(|line| line.price * i64::from(line.quantity))
        .sum();

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let labor = (hours * LABOR_RATE_CENTS as f64).round() as i64;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let min = (subtotal as f64 * RANGE_FLOOR).round() as i64;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let max = (subtotal as f64 * RANGE_CEILING).round() as i64;

    Ok(Quote {
        subtotal,
        range: PriceRange { min, max, labor },
        total_with_labor: subtotal + labor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: u32) -> BomLine {
        BomLine {
            name: format!("item-{price}"),
            description: None,
            price,
            quantity,
            category: None,
        }
    }

    #[test]
    fn test_reference_quote() {
        // BOM [{1000 x2}, {500 x1}] -> subtotal 2500, range 2250..2750
        let bom = vec![line(1000, 2), line(500, 1)];
        let q = quote(&bom, None).expect("valid bom");
        assert_eq!(q.subtotal, 2500);
        assert_eq!(q.range.min, 2250);
        assert_eq!(q.range.max, 2750);
        assert_eq!(q.range.labor, 0);
        assert_eq!(q.total_with_labor, 2500);
    }

    #[test]
    fn test_labor_estimate() {
        let bom = vec![line(1000, 2), line(500, 1)];
        let q = quote(&bom, Some(4.0)).expect("valid bom");
        assert_eq!(q.range.labor, 30000);
        assert_eq!(q.total_with_labor, 32500);
    }

    #[test]
    fn test_fractional_labor_rounds_to_nearest_cent() {
        let q = quote(&[], Some(1.5)).expect("valid bom");
        assert_eq!(q.range.labor, 11250);
        let q = quote(&[], Some(0.333)).expect("valid bom");
        assert_eq!(q.range.labor, 2498); // 0.333 * 7500 = 2497.5
    }

    #[test]
    fn test_empty_bom_quotes_to_zero() {
        let q = quote(&[], None).expect("empty bom is valid");
        assert_eq!(q.subtotal, 0);
        assert_eq!(
            q.range,
            PriceRange {
                min: 0,
                max: 0,
                labor: 0
            }
        );
        assert_eq!(q.total_with_labor, 0);
    }

    #[test]
    fn test_negative_price_rejected() {
        let bom = vec![line(1000, 1), line(-5, 2)];
        let err = quote(&bom, None).expect_err("negative price must fail");
        assert!(matches!(err, PricingError::NegativePrice { index: 1, .. }));
    }

    #[test]
    fn test_negative_labor_rejected() {
        let err = quote(&[], Some(-1.0)).expect_err("negative labor must fail");
        assert_eq!(err, PricingError::NegativeLabor(-1.0));
    }

    #[test]
    fn test_zero_quantity_contributes_nothing() {
        let q = quote(&[line(9999, 0)], None).expect("valid bom");
        assert_eq!(q.subtotal, 0);
    }
}
