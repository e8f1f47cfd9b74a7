//! Cart models.
//!
//! A cart is created lazily on first access per user and never deleted;
//! successful checkout only clears its items. `unit_price` is snapshotted
//! at add time so mid-checkout price changes cannot move a shopper's total.

use chrono::{DateTime, Utc};
use serde::Serialize;

use homegrid_core::{CartId, CartItemId, Currency, ProductId, UserId};

use super::product::Product;

/// A shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub qty: i32,
    /// Price snapshot in minor units, frozen at add time.
    pub unit_price: i64,
}

/// A cart item joined with its product for display and checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemWithProduct {
    pub item: CartItem,
    pub product: Product,
}

/// Cart item wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub title: String,
    pub brand: String,
    pub image: Option<String>,
    pub qty: i32,
    pub unit_price: i64,
    pub line_total: i64,
}

impl From<&CartItemWithProduct> for CartItemView {
    fn from(row: &CartItemWithProduct) -> Self {
        Self {
            id: row.item.id,
            product_id: row.item.product_id,
            title: row.product.title.clone(),
            brand: row.product.brand.clone(),
            image: row.product.images.first().cloned(),
            qty: row.item.qty,
            unit_price: row.item.unit_price,
            line_total: row.item.unit_price * i64::from(row.item.qty),
        }
    }
}

/// Cart wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: CartId,
    pub currency: Currency,
    pub items: Vec<CartItemView>,
    pub subtotal: i64,
    pub item_count: i64,
}

impl CartView {
    /// Assemble the wire shape from a cart and its joined items.
    #[must_use]
    pub fn assemble(cart: &Cart, items: &[CartItemWithProduct]) -> Self {
        let views: Vec<CartItemView> = items.iter().map(CartItemView::from).collect();
        Self {
            id: cart.id,
            currency: cart.currency,
            subtotal: views.iter().map(|v| v.line_total).sum(),
            item_count: views.iter().map(|v| i64::from(v.qty)).sum(),
            items: views,
        }
    }
}
