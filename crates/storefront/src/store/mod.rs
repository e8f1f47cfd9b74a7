//! Store abstraction over the relational catalog.
//!
//! Request handlers, the checkout orchestrator and the maintenance jobs all
//! talk to the store through the [`Store`] trait so tests can substitute the
//! in-memory backend for `PostgreSQL`. Methods return `impl Future + Send`
//! rather than plain `async fn` so generic callers can hold the futures
//! across `.await` points inside multi-threaded handlers.
//!
//! Two invariants are enforced store-side, not in application code:
//!
//! - at most one order per gateway checkout session
//!   ([`Store::create_order`] reports [`OrderOutcome::DuplicateSession`]);
//! - stock never goes negative ([`Store::try_decrement_stock`] is a
//!   conditional decrement).

pub mod memory;
pub mod postgres;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use homegrid_core::catalog::CatalogQuery;
use homegrid_core::{
    BookingId, CartId, CartItemId, CategoryId, ContentType, Currency, OrderStatus, ProductId,
    UserId, UserRole,
};

use crate::models::{
    Booking, Cart, CartItem, CartItemWithProduct, Content, Kit, KitDetail, NewOrder, NewProduct,
    NewProposal, Order, Product, ProductPage, ProductWithCategory, Proposal, User,
};

pub use memory::MemStore;
pub use postgres::PgStore;

/// Errors surfaced by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique-constraint or similar conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A persisted value could not be interpreted.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Result of attempting to materialize an order for a checkout session.
#[derive(Debug, Clone)]
pub enum OrderOutcome {
    /// The order was created; the caller should finish fulfilment.
    Created(Order),
    /// An order for this gateway session already exists (duplicate webhook
    /// delivery); the caller must not decrement stock again.
    DuplicateSession,
}

/// Aggregate catalog numbers for health checks and the analytics job.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub products: u64,
    pub published: u64,
    pub categories: u64,
    pub orders: u64,
    /// Published products with 0 < stock < 5.
    pub low_stock: u64,
    /// Published products with stock = 0.
    pub out_of_stock: u64,
    /// Average CAD price of published products, cents (0 when empty).
    pub avg_price_cad: i64,
    pub min_price_cad: i64,
    pub max_price_cad: i64,
}

/// Fields for inserting a kit (upserted by slug when seeding).
#[derive(Debug, Clone)]
pub struct NewKit {
    pub slug: String,
    pub title: String,
    pub ecosystem: homegrid_core::Ecosystem,
    pub price_cad: i64,
    pub price_usd: i64,
    pub skill_level: homegrid_core::SkillLevel,
    pub includes: serde_json::Value,
    pub faq: serde_json::Value,
    pub published: bool,
    /// (product, quantity) in display order.
    pub items: Vec<(ProductId, i32)>,
}

/// Fields for inserting editorial content (upserted by slug when seeding).
#[derive(Debug, Clone)]
pub struct NewContent {
    pub slug: String,
    pub content_type: ContentType,
    pub title: String,
    pub body: serde_json::Value,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub published: bool,
}

/// Relational store operations used by the storefront.
#[allow(clippy::too_many_arguments)]
pub trait Store: Send + Sync + 'static {
    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    /// Cheap connectivity probe.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn catalog_stats(&self) -> impl Future<Output = Result<CatalogStats, StoreError>> + Send;

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Execute a normalized catalog query over published products.
    fn search_products(
        &self,
        query: CatalogQuery,
    ) -> impl Future<Output = Result<ProductPage, StoreError>> + Send;

    /// Fetch one product (published or not) with its category name.
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<ProductWithCategory>, StoreError>> + Send;

    fn product_by_sku(
        &self,
        sku: &str,
    ) -> impl Future<Output = Result<Option<Product>, StoreError>> + Send;

    /// Up to `limit` other published products in the same category.
    fn related_products(
        &self,
        category: CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ProductWithCategory>, StoreError>> + Send;

    // ------------------------------------------------------------------
    // Carts
    // ------------------------------------------------------------------

    fn cart_for_user(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Option<Cart>, StoreError>> + Send;

    fn create_cart(
        &self,
        user: UserId,
        currency: Currency,
    ) -> impl Future<Output = Result<Cart, StoreError>> + Send;

    fn cart_by_id(
        &self,
        id: CartId,
    ) -> impl Future<Output = Result<Option<Cart>, StoreError>> + Send;

    fn cart_items(
        &self,
        cart: CartId,
    ) -> impl Future<Output = Result<Vec<CartItemWithProduct>, StoreError>> + Send;

    fn find_cart_item(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> impl Future<Output = Result<Option<CartItem>, StoreError>> + Send;

    fn insert_cart_item(
        &self,
        cart: CartId,
        product: ProductId,
        qty: i32,
        unit_price: i64,
    ) -> impl Future<Output = Result<CartItem, StoreError>> + Send;

    fn set_cart_item_qty(
        &self,
        item: CartItemId,
        qty: i32,
    ) -> impl Future<Output = Result<CartItem, StoreError>> + Send;

    /// Fetch a cart item together with its owning cart (for ownership checks).
    fn cart_item(
        &self,
        item: CartItemId,
    ) -> impl Future<Output = Result<Option<(CartItem, Cart)>, StoreError>> + Send;

    fn delete_cart_item(
        &self,
        item: CartItemId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete all items; the cart row itself persists.
    fn clear_cart(&self, cart: CartId) -> impl Future<Output = Result<(), StoreError>> + Send;

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Create an order with its items, guarded by the unique gateway
    /// session id.
    fn create_order(
        &self,
        order: NewOrder,
    ) -> impl Future<Output = Result<OrderOutcome, StoreError>> + Send;

    /// Decrement stock only when `stock >= qty`. Returns whether the
    /// decrement happened.
    fn try_decrement_stock(
        &self,
        product: ProductId,
        qty: i32,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Set the status of all orders carrying this payment-intent id.
    /// Returns the number of orders touched (0 for unknown intents).
    fn set_order_status_by_intent(
        &self,
        intent: &str,
        status: OrderStatus,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn order_by_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Option<Order>, StoreError>> + Send;

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    fn user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    fn user_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Create a user; `StoreError::Conflict` when the email is taken.
    fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> impl Future<Output = Result<User, StoreError>> + Send;

    // ------------------------------------------------------------------
    // Bookings & proposals
    // ------------------------------------------------------------------

    fn create_booking(
        &self,
        user: UserId,
        scheduled_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> impl Future<Output = Result<Booking, StoreError>> + Send;

    /// Fetch a booking only when owned by `user`.
    fn booking_for_user(
        &self,
        id: BookingId,
        user: UserId,
    ) -> impl Future<Output = Result<Option<Booking>, StoreError>> + Send;

    fn create_proposal(
        &self,
        proposal: NewProposal,
    ) -> impl Future<Output = Result<Proposal, StoreError>> + Send;

    /// The user's proposals, newest first.
    fn proposals_for_user(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<Proposal>, StoreError>> + Send;

    // ------------------------------------------------------------------
    // Kits & content
    // ------------------------------------------------------------------

    fn published_kits(&self) -> impl Future<Output = Result<Vec<Kit>, StoreError>> + Send;

    fn kit_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<KitDetail>, StoreError>> + Send;

    fn upsert_kit(
        &self,
        kit: NewKit,
    ) -> impl Future<Output = Result<homegrid_core::KitId, StoreError>> + Send;

    fn published_content(
        &self,
        content_type: Option<ContentType>,
    ) -> impl Future<Output = Result<Vec<Content>, StoreError>> + Send;

    fn content_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Content>, StoreError>> + Send;

    fn upsert_content(
        &self,
        content: NewContent,
    ) -> impl Future<Output = Result<homegrid_core::ContentId, StoreError>> + Send;

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Every product, published or not (maintenance jobs only).
    fn all_products(&self) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send;

    fn update_product_prices(
        &self,
        id: ProductId,
        price_cad: i64,
        price_usd: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn set_stock(
        &self,
        id: ProductId,
        stock: i32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn set_published(
        &self,
        id: ProductId,
        published: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Upsert a category keyed by (name, parent); returns its id.
    fn upsert_category(
        &self,
        name: &str,
        parent: Option<&str>,
        description: Option<&str>,
    ) -> impl Future<Output = Result<CategoryId, StoreError>> + Send;

    /// Upsert a product keyed by sku; returns its id.
    fn upsert_product(
        &self,
        product: NewProduct,
    ) -> impl Future<Output = Result<ProductId, StoreError>> + Send;
}
