//! In-memory store backend.
//!
//! Backs tests and local demos. A single mutex guards all tables; every
//! trait method completes its work inside one lock acquisition, which gives
//! the same per-entity atomicity the `PostgreSQL` backend gets from
//! transactions and conditional updates.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use homegrid_core::catalog::{CatalogQuery, SortKey};
use homegrid_core::{
    BookingId, CartId, CartItemId, CategoryId, ContentId, ContentType, Currency, KitId, OrderId,
    OrderItemId, OrderStatus, ProductId, ProposalStatus, UserId, UserRole,
};

use crate::models::{
    Booking, Cart, CartItem, CartItemWithProduct, Content, Kit, KitDetail, KitItem,
    KitItemWithProduct, NewOrder, NewProduct, NewProposal, Order, OrderItem, Product, ProductPage,
    ProductWithCategory, Proposal, User,
};

use super::{CatalogStats, NewContent, NewKit, OrderOutcome, Store, StoreError};

#[derive(Debug, Clone)]
struct MemCategory {
    id: CategoryId,
    name: String,
    parent: Option<String>,
    description: Option<String>,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    categories: Vec<MemCategory>,
    products: Vec<Product>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    users: Vec<User>,
    bookings: Vec<Booking>,
    proposals: Vec<Proposal>,
    kits: Vec<Kit>,
    kit_items: Vec<KitItem>,
    content: Vec<Content>,
}

impl Inner {
    fn bump(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn category_name(&self, id: CategoryId) -> String {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map_or_else(|| "Uncategorized".to_owned(), |c| c.name.clone())
    }

    fn with_category(&self, product: &Product) -> ProductWithCategory {
        ProductWithCategory {
            product: product.clone(),
            category_name: self.category_name(product.category_id),
        }
    }
}

/// In-memory [`Store`] implementation.
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means another test thread panicked; the data
        // is still structurally sound.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn matches(query: &CatalogQuery, p: &Product) -> bool {
    if !p.published {
        return false;
    }
    if let Some(text) = &query.text {
        let needle = text.to_lowercase();
        let hit = [&p.title, &p.short_desc, &p.long_desc, &p.brand]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    if let Some(category) = query.category
        && p.category_id != category
    {
        return false;
    }
    if let Some(min) = query.price_min_cents
        && p.price_cad < min
    {
        return false;
    }
    if let Some(max) = query.price_max_cents
        && p.price_cad > max
    {
        return false;
    }
    if let Some(protocol) = &query.protocol
        && &p.protocol != protocol
    {
        return false;
    }
    if let Some(flag) = query.works
        && !p.compat.supports(flag)
    {
        return false;
    }
    if let Some(room) = &query.room
        && !p.room_tags.iter().any(|tag| tag == room)
    {
        return false;
    }
    if query.beginner_only && !p.beginner_friendly {
        return false;
    }
    true
}

/// Sort comparator matching the SQL `ORDER BY <key>, id ASC`.
fn compare(sort: SortKey, a: &Product, b: &Product) -> Ordering {
    let key = match sort {
        SortKey::CreatedDesc => b.created_at.cmp(&a.created_at),
        SortKey::PriceAsc => a.price_cad.cmp(&b.price_cad),
        SortKey::PriceDesc => b.price_cad.cmp(&a.price_cad),
        SortKey::NameAsc => a.title.cmp(&b.title),
        SortKey::NameDesc => b.title.cmp(&a.title),
    };
    key.then(a.id.cmp(&b.id))
}

impl Store for MemStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn catalog_stats(&self) -> Result<CatalogStats, StoreError> {
        let inner = self.lock();
        let published: Vec<&Product> = inner.products.iter().filter(|p| p.published).collect();
        let prices: Vec<i64> = published.iter().map(|p| p.price_cad).collect();
        #[allow(clippy::cast_possible_wrap)]
        let avg = if prices.is_empty() {
            0
        } else {
            prices.iter().sum::<i64>() / prices.len() as i64
        };
        Ok(CatalogStats {
            products: inner.products.len() as u64,
            published: published.len() as u64,
            categories: inner.categories.len() as u64,
            orders: inner.orders.len() as u64,
            low_stock: published.iter().filter(|p| p.stock > 0 && p.stock < 5).count() as u64,
            out_of_stock: published.iter().filter(|p| p.stock == 0).count() as u64,
            avg_price_cad: avg,
            min_price_cad: prices.iter().copied().min().unwrap_or(0),
            max_price_cad: prices.iter().copied().max().unwrap_or(0),
        })
    }

    async fn search_products(&self, query: CatalogQuery) -> Result<ProductPage, StoreError> {
        let inner = self.lock();
        let mut hits: Vec<&Product> = inner
            .products
            .iter()
            .filter(|p| matches(&query, p))
            .collect();
        hits.sort_by(|a, b| compare(query.sort, a, b));

        let total = hits.len() as u64;
        let items = hits
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .map(|p| inner.with_category(p))
            .collect();

        Ok(ProductPage { items, total })
    }

    async fn product(&self, id: ProductId) -> Result<Option<ProductWithCategory>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| inner.with_category(p)))
    }

    async fn product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.lock();
        Ok(inner.products.iter().find(|p| p.sku == sku).cloned())
    }

    async fn related_products(
        &self,
        category: CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<ProductWithCategory>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .products
            .iter()
            .filter(|p| p.published && p.category_id == category && p.id != exclude)
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|p| inner.with_category(p))
            .collect())
    }

    async fn cart_for_user(&self, user: UserId) -> Result<Option<Cart>, StoreError> {
        let inner = self.lock();
        Ok(inner.carts.iter().find(|c| c.user_id == user).cloned())
    }

    async fn create_cart(&self, user: UserId, currency: Currency) -> Result<Cart, StoreError> {
        let mut inner = self.lock();
        let cart = Cart {
            id: CartId::new(inner.bump()),
            user_id: user,
            currency,
            created_at: Utc::now(),
        };
        inner.carts.push(cart.clone());
        Ok(cart)
    }

    async fn cart_by_id(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        let inner = self.lock();
        Ok(inner.carts.iter().find(|c| c.id == id).cloned())
    }

    async fn cart_items(&self, cart: CartId) -> Result<Vec<CartItemWithProduct>, StoreError> {
        let inner = self.lock();
        let mut rows = Vec::new();
        for item in inner.cart_items.iter().filter(|i| i.cart_id == cart) {
            let product = inner
                .products
                .iter()
                .find(|p| p.id == item.product_id)
                .ok_or_else(|| {
                    StoreError::DataCorruption(format!(
                        "cart item {} references missing product {}",
                        item.id, item.product_id
                    ))
                })?;
            rows.push(CartItemWithProduct {
                item: item.clone(),
                product: product.clone(),
            });
        }
        Ok(rows)
    }

    async fn find_cart_item(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<Option<CartItem>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .cart_items
            .iter()
            .find(|i| i.cart_id == cart && i.product_id == product)
            .cloned())
    }

    async fn insert_cart_item(
        &self,
        cart: CartId,
        product: ProductId,
        qty: i32,
        unit_price: i64,
    ) -> Result<CartItem, StoreError> {
        let mut inner = self.lock();
        let item = CartItem {
            id: CartItemId::new(inner.bump()),
            cart_id: cart,
            product_id: product,
            qty,
            unit_price,
        };
        inner.cart_items.push(item.clone());
        Ok(item)
    }

    async fn set_cart_item_qty(&self, item: CartItemId, qty: i32) -> Result<CartItem, StoreError> {
        let mut inner = self.lock();
        let row = inner
            .cart_items
            .iter_mut()
            .find(|i| i.id == item)
            .ok_or_else(|| StoreError::Conflict(format!("cart item {item} not found")))?;
        row.qty = qty;
        Ok(row.clone())
    }

    async fn cart_item(&self, item: CartItemId) -> Result<Option<(CartItem, Cart)>, StoreError> {
        let inner = self.lock();
        let Some(row) = inner.cart_items.iter().find(|i| i.id == item) else {
            return Ok(None);
        };
        let cart = inner
            .carts
            .iter()
            .find(|c| c.id == row.cart_id)
            .ok_or_else(|| {
                StoreError::DataCorruption(format!("cart item {item} has no owning cart"))
            })?;
        Ok(Some((row.clone(), cart.clone())))
    }

    async fn delete_cart_item(&self, item: CartItemId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.cart_items.retain(|i| i.id != item);
        Ok(())
    }

    async fn clear_cart(&self, cart: CartId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.cart_items.retain(|i| i.cart_id != cart);
        Ok(())
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderOutcome, StoreError> {
        let mut inner = self.lock();
        if inner
            .orders
            .iter()
            .any(|o| o.gateway_session_id == order.gateway_session_id)
        {
            return Ok(OrderOutcome::DuplicateSession);
        }
        let row = Order {
            id: OrderId::new(inner.bump()),
            user_id: order.user_id,
            total_cents: order.total_cents,
            currency: order.currency,
            status: OrderStatus::Processing,
            gateway_session_id: order.gateway_session_id,
            gateway_payment_intent: order.gateway_payment_intent,
            shipping_addr: order.shipping_addr,
            billing_addr: order.billing_addr,
            created_at: Utc::now(),
        };
        for item in order.items {
            let id = OrderItemId::new(inner.bump());
            inner.order_items.push(OrderItem {
                id,
                order_id: row.id,
                product_id: item.product_id,
                qty: item.qty,
                unit_price: item.unit_price,
            });
        }
        inner.orders.push(row.clone());
        Ok(OrderOutcome::Created(row))
    }

    async fn try_decrement_stock(&self, product: ProductId, qty: i32) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let Some(row) = inner.products.iter_mut().find(|p| p.id == product) else {
            return Ok(false);
        };
        if row.stock < qty {
            return Ok(false);
        }
        row.stock -= qty;
        Ok(true)
    }

    async fn set_order_status_by_intent(
        &self,
        intent: &str,
        status: OrderStatus,
    ) -> Result<u64, StoreError> {
        let mut inner = self.lock();
        let mut touched = 0;
        for order in &mut inner.orders {
            if order.gateway_payment_intent.as_deref() == Some(intent) {
                order.status = status;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn order_by_session(&self, session_id: &str) -> Result<Option<Order>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .orders
            .iter()
            .find(|o| o.gateway_session_id == session_id)
            .cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.lock();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let inner = self.lock();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }
        let user = User {
            id: UserId::new(inner.bump()),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            role,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn create_booking(
        &self,
        user: UserId,
        scheduled_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Booking, StoreError> {
        let mut inner = self.lock();
        let booking = Booking {
            id: BookingId::new(inner.bump()),
            user_id: user,
            scheduled_at,
            notes,
            created_at: Utc::now(),
        };
        inner.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn booking_for_user(
        &self,
        id: BookingId,
        user: UserId,
    ) -> Result<Option<Booking>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .bookings
            .iter()
            .find(|b| b.id == id && b.user_id == user)
            .cloned())
    }

    async fn create_proposal(&self, proposal: NewProposal) -> Result<Proposal, StoreError> {
        let mut inner = self.lock();
        let row = Proposal {
            id: homegrid_core::ProposalId::new(inner.bump()),
            user_id: proposal.user_id,
            booking_id: proposal.booking_id,
            bom: proposal.bom,
            labor_hours_est: proposal.labor_hours_est,
            price_range: proposal.price_range,
            status: ProposalStatus::Draft,
            notes: proposal.notes,
            created_at: Utc::now(),
        };
        inner.proposals.push(row.clone());
        Ok(row)
    }

    async fn proposals_for_user(&self, user: UserId) -> Result<Vec<Proposal>, StoreError> {
        let inner = self.lock();
        let mut rows: Vec<Proposal> = inner
            .proposals
            .iter()
            .filter(|p| p.user_id == user)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn published_kits(&self) -> Result<Vec<Kit>, StoreError> {
        let inner = self.lock();
        Ok(inner.kits.iter().filter(|k| k.published).cloned().collect())
    }

    async fn kit_by_slug(&self, slug: &str) -> Result<Option<KitDetail>, StoreError> {
        let inner = self.lock();
        let Some(kit) = inner
            .kits
            .iter()
            .find(|k| k.slug == slug && k.published)
            .cloned()
        else {
            return Ok(None);
        };
        let mut items: Vec<&KitItem> = inner
            .kit_items
            .iter()
            .filter(|i| i.kit_id == kit.id)
            .collect();
        items.sort_by_key(|i| i.position);
        let mut joined = Vec::new();
        for item in items {
            let product = inner
                .products
                .iter()
                .find(|p| p.id == item.product_id)
                .ok_or_else(|| {
                    StoreError::DataCorruption(format!(
                        "kit {} references missing product {}",
                        kit.slug, item.product_id
                    ))
                })?;
            joined.push(KitItemWithProduct {
                item: item.clone(),
                product: product.clone(),
            });
        }
        Ok(Some(KitDetail { kit, items: joined }))
    }

    async fn upsert_kit(&self, kit: NewKit) -> Result<KitId, StoreError> {
        let mut inner = self.lock();
        let id = if let Some(existing) = inner.kits.iter().position(|k| k.slug == kit.slug) {
            let id = inner.kits[existing].id;
            inner.kit_items.retain(|i| i.kit_id != id);
            id
        } else {
            KitId::new(inner.bump())
        };
        let row = Kit {
            id,
            slug: kit.slug,
            title: kit.title,
            ecosystem: kit.ecosystem,
            price_cad: kit.price_cad,
            price_usd: kit.price_usd,
            skill_level: kit.skill_level,
            includes: kit.includes,
            faq: kit.faq,
            published: kit.published,
            created_at: Utc::now(),
        };
        inner.kits.retain(|k| k.id != id);
        inner.kits.push(row);
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        for (position, (product_id, qty)) in kit.items.into_iter().enumerate() {
            inner.kit_items.push(KitItem {
                kit_id: id,
                product_id,
                qty,
                position: position as i32,
            });
        }
        Ok(id)
    }

    async fn published_content(
        &self,
        content_type: Option<ContentType>,
    ) -> Result<Vec<Content>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .content
            .iter()
            .filter(|c| c.published && content_type.is_none_or(|t| c.content_type == t))
            .cloned()
            .collect())
    }

    async fn content_by_slug(&self, slug: &str) -> Result<Option<Content>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .content
            .iter()
            .find(|c| c.slug == slug && c.published)
            .cloned())
    }

    async fn upsert_content(&self, content: NewContent) -> Result<ContentId, StoreError> {
        let mut inner = self.lock();
        let existing = inner
            .content
            .iter()
            .find(|c| c.slug == content.slug)
            .map(|c| c.id);
        let id = match existing {
            Some(id) => id,
            None => ContentId::new(inner.bump()),
        };
        inner.content.retain(|c| c.id != id);
        inner.content.push(Content {
            id,
            slug: content.slug,
            content_type: content.content_type,
            title: content.title,
            body: content.body,
            seo_title: content.seo_title,
            seo_description: content.seo_description,
            published: content.published,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn all_products(&self) -> Result<Vec<Product>, StoreError> {
        let inner = self.lock();
        Ok(inner.products.clone())
    }

    async fn update_product_prices(
        &self,
        id: ProductId,
        price_cad: i64,
        price_usd: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(row) = inner.products.iter_mut().find(|p| p.id == id) {
            row.price_cad = price_cad;
            row.price_usd = price_usd;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_stock(&self, id: ProductId, stock: i32) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(row) = inner.products.iter_mut().find(|p| p.id == id) {
            row.stock = stock.max(0);
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_published(&self, id: ProductId, published: bool) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(row) = inner.products.iter_mut().find(|p| p.id == id) {
            row.published = published;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn upsert_category(
        &self,
        name: &str,
        parent: Option<&str>,
        description: Option<&str>,
    ) -> Result<CategoryId, StoreError> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .categories
            .iter()
            .find(|c| c.name == name && c.parent.as_deref() == parent)
        {
            return Ok(existing.id);
        }
        let id = CategoryId::new(inner.bump());
        inner.categories.push(MemCategory {
            id,
            name: name.to_owned(),
            parent: parent.map(str::to_owned),
            description: description.map(str::to_owned),
        });
        Ok(id)
    }

    async fn upsert_product(&self, product: NewProduct) -> Result<ProductId, StoreError> {
        let mut inner = self.lock();
        let now = Utc::now();
        if let Some(row) = inner.products.iter_mut().find(|p| p.sku == product.sku) {
            let id = row.id;
            let created_at = row.created_at;
            *row = Product {
                id,
                sku: product.sku,
                title: product.title,
                brand: product.brand,
                short_desc: product.short_desc,
                long_desc: product.long_desc,
                price_cad: product.price_cad,
                price_usd: product.price_usd,
                stock: product.stock,
                images: product.images,
                protocol: product.protocol,
                power: product.power,
                room_tags: product.room_tags,
                beginner_friendly: product.beginner_friendly,
                compat: product.compat,
                requires_bridge: product.requires_bridge,
                published: product.published,
                category_id: product.category_id,
                created_at,
                updated_at: now,
            };
            return Ok(id);
        }
        let id = ProductId::new(inner.bump());
        inner.products.push(Product {
            id,
            sku: product.sku,
            title: product.title,
            brand: product.brand,
            short_desc: product.short_desc,
            long_desc: product.long_desc,
            price_cad: product.price_cad,
            price_usd: product.price_usd,
            stock: product.stock,
            images: product.images,
            protocol: product.protocol,
            power: product.power,
            room_tags: product.room_tags,
            beginner_friendly: product.beginner_friendly,
            compat: product.compat,
            requires_bridge: product.requires_bridge,
            published: product.published,
            category_id: product.category_id,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{catalog_query, new_product};

    #[tokio::test]
    async fn test_search_filters_unpublished() {
        let store = MemStore::new();
        let cat = store.upsert_category("Lighting", None, None).await.expect("category");
        let mut hidden = new_product("SKU-HIDDEN", cat);
        hidden.published = false;
        store.upsert_product(hidden).await.expect("product");
        store
            .upsert_product(new_product("SKU-LIVE", cat))
            .await
            .expect("product");

        let page = store
            .search_products(catalog_query(&[]))
            .await
            .expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].product.sku, "SKU-LIVE");
        assert_eq!(page.items[0].category_name, "Lighting");
    }

    #[tokio::test]
    async fn test_conditional_decrement_floors_at_stock() {
        let store = MemStore::new();
        let cat = store.upsert_category("Sensors", None, None).await.expect("category");
        let mut p = new_product("SKU-1", cat);
        p.stock = 3;
        let id = store.upsert_product(p).await.expect("product");

        assert!(store.try_decrement_stock(id, 2).await.expect("decrement"));
        assert!(!store.try_decrement_stock(id, 2).await.expect("decrement"));
        let row = store.product(id).await.expect("fetch").expect("exists");
        assert_eq!(row.product.stock, 1);
    }

    #[tokio::test]
    async fn test_concurrent_decrements_never_go_negative() {
        let store = MemStore::new();
        let cat = store.upsert_category("Sensors", None, None).await.expect("category");
        let mut p = new_product("SKU-1", cat);
        p.stock = 5;
        let id = store.upsert_product(p).await.expect("product");

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.try_decrement_stock(id, 2).await.expect("decrement")
            }));
        }
        let mut succeeded = 0;
        for handle in handles {
            if handle.await.expect("join") {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 2, "only two checkouts fit in 5 units");
        let row = store.product(id).await.expect("fetch").expect("exists");
        assert_eq!(row.product.stock, 1);
    }

    #[tokio::test]
    async fn test_duplicate_session_creates_one_order() {
        let store = MemStore::new();
        let user = store
            .create_user("a@example.com", "hash", UserRole::Customer)
            .await
            .expect("user");
        let order = NewOrder {
            user_id: user.id,
            total_cents: 1000,
            currency: Currency::CAD,
            gateway_session_id: "cs_test_1".to_owned(),
            gateway_payment_intent: Some("pi_1".to_owned()),
            shipping_addr: serde_json::json!({}),
            billing_addr: serde_json::json!({}),
            items: vec![],
        };
        let first = store.create_order(order.clone()).await.expect("create");
        assert!(matches!(first, OrderOutcome::Created(_)));
        let second = store.create_order(order).await.expect("create");
        assert!(matches!(second, OrderOutcome::DuplicateSession));
    }

    #[tokio::test]
    async fn test_upsert_product_is_idempotent_by_sku() {
        let store = MemStore::new();
        let cat = store.upsert_category("Hubs", None, None).await.expect("category");
        let first = store
            .upsert_product(new_product("SKU-X", cat))
            .await
            .expect("insert");
        let mut updated = new_product("SKU-X", cat);
        updated.price_cad = 1234;
        let second = store.upsert_product(updated).await.expect("upsert");
        assert_eq!(first, second);
        let all = store.all_products().await.expect("all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].price_cad, 1234);
    }
}
