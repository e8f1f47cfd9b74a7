//! Order models.
//!
//! Orders are created only by the checkout orchestrator upon a confirmed
//! payment event, and are immutable afterwards except for status
//! transitions. `gateway_session_id` is unique so duplicate webhook
//! deliveries cannot materialize a second order.

use chrono::{DateTime, Utc};
use serde::Serialize;

use homegrid_core::{Currency, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A completed (paid or payment-pending) order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_cents: i64,
    pub currency: Currency,
    pub status: OrderStatus,
    /// Gateway checkout session id; unique across orders.
    pub gateway_session_id: String,
    /// Gateway payment-intent id once known.
    pub gateway_payment_intent: Option<String>,
    pub shipping_addr: serde_json::Value,
    pub billing_addr: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One line of an order, frozen at materialization time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub qty: i32,
    pub unit_price: i64,
}

/// Fields for materializing an order from a completed checkout session.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_cents: i64,
    pub currency: Currency,
    pub gateway_session_id: String,
    pub gateway_payment_intent: Option<String>,
    pub shipping_addr: serde_json::Value,
    pub billing_addr: serde_json::Value,
    pub items: Vec<NewOrderItem>,
}

/// One line of a new order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub qty: i32,
    pub unit_price: i64,
}
