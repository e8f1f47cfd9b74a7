//! `PostgreSQL` store backend.
//!
//! Uses the sqlx runtime query API throughout; filters for the catalog
//! search are assembled with `QueryBuilder` so the same condition set backs
//! both the page query and the total count. Schema lives in
//! `crates/storefront/migrations/`.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use homegrid_core::catalog::{CatalogQuery, CompatFlag, SortKey};
use homegrid_core::pricing::{BomLine, PriceRange};
use homegrid_core::{
    BookingId, CartId, CartItemId, CategoryId, ContentId, ContentType, Currency, KitId, OrderId,
    OrderItemId, OrderStatus, ProductId, ProposalId, ProposalStatus, UserId, UserRole,
};

use crate::models::{
    Booking, Cart, CartItem, CartItemWithProduct, Compatibility, Content, Kit, KitDetail, KitItem,
    KitItemWithProduct, NewOrder, NewProduct, NewProposal, Order, Product, ProductPage,
    ProductWithCategory, Proposal, User,
};

use super::{CatalogStats, NewContent, NewKit, OrderOutcome, Store, StoreError};

/// `PostgreSQL`-backed [`Store`] implementation.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool (migrations, session store).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn corrupt<E: std::fmt::Display>(what: &str) -> impl FnOnce(E) -> StoreError + '_ {
    move |e| StoreError::DataCorruption(format!("invalid {what} in database: {e}"))
}

fn parse_text<T>(row: &PgRow, column: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column)?;
    T::from_str(&raw).map_err(corrupt(column))
}

fn json_column<T: serde::de::DeserializeOwned>(row: &PgRow, column: &str) -> Result<T, StoreError> {
    let value: serde_json::Value = row.try_get(column)?;
    serde_json::from_value(value).map_err(corrupt(column))
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        sku: row.try_get("sku")?,
        title: row.try_get("title")?,
        brand: row.try_get("brand")?,
        short_desc: row.try_get("short_desc")?,
        long_desc: row.try_get("long_desc")?,
        price_cad: row.try_get("price_cad")?,
        price_usd: row.try_get("price_usd")?,
        stock: row.try_get("stock")?,
        images: row.try_get("images")?,
        protocol: row.try_get("protocol")?,
        power: row.try_get("power")?,
        room_tags: row.try_get("room_tags")?,
        beginner_friendly: row.try_get("beginner_friendly")?,
        compat: Compatibility {
            google: row.try_get("works_google")?,
            alexa: row.try_get("works_alexa")?,
            ha: row.try_get("works_ha")?,
            matter: row.try_get("works_matter")?,
            zigbee: row.try_get("works_zigbee")?,
            zwave: row.try_get("works_zwave")?,
            thread: row.try_get("works_thread")?,
        },
        requires_bridge: row.try_get("requires_bridge")?,
        published: row.try_get("published")?,
        category_id: CategoryId::new(row.try_get("category_id")?),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn product_with_category_from_row(row: &PgRow) -> Result<ProductWithCategory, StoreError> {
    Ok(ProductWithCategory {
        product: product_from_row(row)?,
        category_name: row.try_get("category_name")?,
    })
}

fn cart_from_row(row: &PgRow) -> Result<Cart, StoreError> {
    Ok(Cart {
        id: CartId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        currency: parse_text(row, "currency")?,
        created_at: row.try_get("created_at")?,
    })
}

fn cart_item_from_row(row: &PgRow) -> Result<CartItem, StoreError> {
    Ok(CartItem {
        id: CartItemId::new(row.try_get("id")?),
        cart_id: CartId::new(row.try_get("cart_id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        qty: row.try_get("qty")?,
        unit_price: row.try_get("unit_price")?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        total_cents: row.try_get("total_cents")?,
        currency: parse_text(row, "currency")?,
        status: parse_text(row, "status")?,
        gateway_session_id: row.try_get("gateway_session_id")?,
        gateway_payment_intent: row.try_get("gateway_payment_intent")?,
        shipping_addr: row.try_get("shipping_addr")?,
        billing_addr: row.try_get("billing_addr")?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_text(row, "role")?,
        created_at: row.try_get("created_at")?,
    })
}

fn booking_from_row(row: &PgRow) -> Result<Booking, StoreError> {
    Ok(Booking {
        id: BookingId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        scheduled_at: row.try_get("scheduled_at")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

fn proposal_from_row(row: &PgRow) -> Result<Proposal, StoreError> {
    Ok(Proposal {
        id: ProposalId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        booking_id: BookingId::new(row.try_get("booking_id")?),
        bom: json_column::<Vec<BomLine>>(row, "bom")?,
        labor_hours_est: row.try_get("labor_hours_est")?,
        price_range: json_column::<PriceRange>(row, "price_range")?,
        status: parse_text(row, "status")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

fn kit_from_row(row: &PgRow) -> Result<Kit, StoreError> {
    Ok(Kit {
        id: KitId::new(row.try_get("id")?),
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        ecosystem: parse_text(row, "ecosystem")?,
        price_cad: row.try_get("price_cad")?,
        price_usd: row.try_get("price_usd")?,
        skill_level: parse_text(row, "skill_level")?,
        includes: row.try_get("includes")?,
        faq: row.try_get("faq")?,
        published: row.try_get("published")?,
        created_at: row.try_get("created_at")?,
    })
}

fn content_from_row(row: &PgRow) -> Result<Content, StoreError> {
    Ok(Content {
        id: ContentId::new(row.try_get("id")?),
        slug: row.try_get("slug")?,
        content_type: parse_text(row, "content_type")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        seo_title: row.try_get("seo_title")?,
        seo_description: row.try_get("seo_description")?,
        published: row.try_get("published")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Escape `%`, `_` and `\` for use inside an ILIKE pattern.
fn like_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

const fn works_column(flag: CompatFlag) -> &'static str {
    match flag {
        CompatFlag::Google => "p.works_google",
        CompatFlag::Alexa => "p.works_alexa",
        CompatFlag::Ha => "p.works_ha",
        CompatFlag::Matter => "p.works_matter",
        CompatFlag::Zigbee => "p.works_zigbee",
        CompatFlag::Zwave => "p.works_zwave",
        CompatFlag::Thread => "p.works_thread",
    }
}

const fn order_by(sort: SortKey) -> &'static str {
    match sort {
        SortKey::CreatedDesc => " ORDER BY p.created_at DESC, p.id ASC",
        SortKey::PriceAsc => " ORDER BY p.price_cad ASC, p.id ASC",
        SortKey::PriceDesc => " ORDER BY p.price_cad DESC, p.id ASC",
        SortKey::NameAsc => " ORDER BY p.title ASC, p.id ASC",
        SortKey::NameDesc => " ORDER BY p.title DESC, p.id ASC",
    }
}

/// Append the WHERE conditions shared by the page and count queries.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &CatalogQuery) {
    qb.push(" WHERE p.published = TRUE");

    if let Some(text) = &query.text {
        let pattern = format!("%{}%", like_escape(text));
        qb.push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.short_desc ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.long_desc ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.brand ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = query.category {
        qb.push(" AND p.category_id = ").push_bind(category.as_i32());
    }
    if let Some(min) = query.price_min_cents {
        qb.push(" AND p.price_cad >= ").push_bind(min);
    }
    if let Some(max) = query.price_max_cents {
        qb.push(" AND p.price_cad <= ").push_bind(max);
    }
    if let Some(protocol) = &query.protocol {
        qb.push(" AND p.protocol = ").push_bind(protocol.clone());
    }
    if let Some(flag) = query.works {
        qb.push(" AND ").push(works_column(flag)).push(" = TRUE");
    }
    if let Some(room) = &query.room {
        qb.push(" AND ").push_bind(room.clone()).push(" = ANY(p.room_tags)");
    }
    if query.beginner_only {
        qb.push(" AND p.beginner_friendly = TRUE");
    }
}

impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn catalog_stats(&self) -> Result<CatalogStats, StoreError> {
        let row = sqlx::query(
            r"
            SELECT
                (SELECT COUNT(*) FROM products)                                         AS products,
                (SELECT COUNT(*) FROM products WHERE published)                         AS published,
                (SELECT COUNT(*) FROM categories)                                       AS categories,
                (SELECT COUNT(*) FROM orders)                                           AS orders,
                (SELECT COUNT(*) FROM products WHERE published AND stock > 0 AND stock < 5) AS low_stock,
                (SELECT COUNT(*) FROM products WHERE published AND stock = 0)           AS out_of_stock,
                (SELECT COALESCE(AVG(price_cad), 0)::BIGINT FROM products WHERE published) AS avg_price_cad,
                (SELECT COALESCE(MIN(price_cad), 0) FROM products WHERE published)      AS min_price_cad,
                (SELECT COALESCE(MAX(price_cad), 0) FROM products WHERE published)      AS max_price_cad
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        let count = |column: &str| -> Result<u64, StoreError> {
            let value: i64 = row.try_get(column)?;
            Ok(u64::try_from(value).unwrap_or(0))
        };

        Ok(CatalogStats {
            products: count("products")?,
            published: count("published")?,
            categories: count("categories")?,
            orders: count("orders")?,
            low_stock: count("low_stock")?,
            out_of_stock: count("out_of_stock")?,
            avg_price_cad: row.try_get("avg_price_cad")?,
            min_price_cad: row.try_get("min_price_cad")?,
            max_price_cad: row.try_get("max_price_cad")?,
        })
    }

    async fn search_products(&self, query: CatalogQuery) -> Result<ProductPage, StoreError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) AS total FROM products p");
        push_filters(&mut count_qb, &query);
        let total: i64 = count_qb
            .build()
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;

        let mut qb = QueryBuilder::new(
            "SELECT p.*, c.name AS category_name FROM products p \
             JOIN categories c ON c.id = p.category_id",
        );
        push_filters(&mut qb, &query);
        qb.push(order_by(query.sort));
        qb.push(" LIMIT ").push_bind(i64::from(query.limit));
        qb.push(" OFFSET ").push_bind(i64::from(query.offset()));

        let rows = qb.build().fetch_all(&self.pool).await?;
        let items = rows
            .iter()
            .map(product_with_category_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductPage {
            items,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn product(&self, id: ProductId) -> Result<Option<ProductWithCategory>, StoreError> {
        let row = sqlx::query(
            "SELECT p.*, c.name AS category_name FROM products p \
             JOIN categories c ON c.id = p.category_id WHERE p.id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(product_with_category_from_row).transpose()
    }

    async fn product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT * FROM products WHERE sku = $1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn related_products(
        &self,
        category: CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<ProductWithCategory>, StoreError> {
        let rows = sqlx::query(
            "SELECT p.*, c.name AS category_name FROM products p \
             JOIN categories c ON c.id = p.category_id \
             WHERE p.category_id = $1 AND p.id <> $2 AND p.published \
             ORDER BY p.created_at DESC, p.id ASC LIMIT $3",
        )
        .bind(category.as_i32())
        .bind(exclude.as_i32())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(product_with_category_from_row).collect()
    }

    async fn cart_for_user(&self, user: UserId) -> Result<Option<Cart>, StoreError> {
        let row = sqlx::query("SELECT * FROM carts WHERE user_id = $1")
            .bind(user.as_i32())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(cart_from_row).transpose()
    }

    async fn create_cart(&self, user: UserId, currency: Currency) -> Result<Cart, StoreError> {
        let row = sqlx::query(
            "INSERT INTO carts (user_id, currency) VALUES ($1, $2) RETURNING *",
        )
        .bind(user.as_i32())
        .bind(currency.code())
        .fetch_one(&self.pool)
        .await?;
        cart_from_row(&row)
    }

    async fn cart_by_id(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        let row = sqlx::query("SELECT * FROM carts WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(cart_from_row).transpose()
    }

    async fn cart_items(&self, cart: CartId) -> Result<Vec<CartItemWithProduct>, StoreError> {
        let rows = sqlx::query(
            "SELECT ci.id AS item_id, ci.cart_id, ci.product_id, ci.qty, ci.unit_price, p.* \
             FROM cart_items ci JOIN products p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 ORDER BY ci.id",
        )
        .bind(cart.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CartItemWithProduct {
                    item: CartItem {
                        id: CartItemId::new(row.try_get("item_id")?),
                        cart_id: CartId::new(row.try_get("cart_id")?),
                        product_id: ProductId::new(row.try_get("product_id")?),
                        qty: row.try_get("qty")?,
                        unit_price: row.try_get("unit_price")?,
                    },
                    product: product_from_row(row)?,
                })
            })
            .collect()
    }

    async fn find_cart_item(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<Option<CartItem>, StoreError> {
        let row = sqlx::query("SELECT * FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart.as_i32())
            .bind(product.as_i32())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(cart_item_from_row).transpose()
    }

    async fn insert_cart_item(
        &self,
        cart: CartId,
        product: ProductId,
        qty: i32,
        unit_price: i64,
    ) -> Result<CartItem, StoreError> {
        let row = sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, qty, unit_price) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(cart.as_i32())
        .bind(product.as_i32())
        .bind(qty)
        .bind(unit_price)
        .fetch_one(&self.pool)
        .await?;
        cart_item_from_row(&row)
    }

    async fn set_cart_item_qty(&self, item: CartItemId, qty: i32) -> Result<CartItem, StoreError> {
        let row = sqlx::query("UPDATE cart_items SET qty = $2 WHERE id = $1 RETURNING *")
            .bind(item.as_i32())
            .bind(qty)
            .fetch_one(&self.pool)
            .await?;
        cart_item_from_row(&row)
    }

    async fn cart_item(&self, item: CartItemId) -> Result<Option<(CartItem, Cart)>, StoreError> {
        let row = sqlx::query(
            "SELECT ci.id AS item_id, ci.cart_id, ci.product_id, ci.qty, ci.unit_price, \
                    c.id AS cart_pk, c.user_id, c.currency, c.created_at \
             FROM cart_items ci JOIN carts c ON c.id = ci.cart_id WHERE ci.id = $1",
        )
        .bind(item.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok((
                CartItem {
                    id: CartItemId::new(row.try_get("item_id")?),
                    cart_id: CartId::new(row.try_get("cart_id")?),
                    product_id: ProductId::new(row.try_get("product_id")?),
                    qty: row.try_get("qty")?,
                    unit_price: row.try_get("unit_price")?,
                },
                Cart {
                    id: CartId::new(row.try_get("cart_pk")?),
                    user_id: UserId::new(row.try_get("user_id")?),
                    currency: parse_text(&row, "currency")?,
                    created_at: row.try_get("created_at")?,
                },
            ))
        })
        .transpose()
    }

    async fn delete_cart_item(&self, item: CartItemId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(item.as_i32())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_cart(&self, cart: CartId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart.as_i32())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO orders (user_id, total_cents, currency, status, \
                                 gateway_session_id, gateway_payment_intent, \
                                 shipping_addr, billing_addr) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(order.user_id.as_i32())
        .bind(order.total_cents)
        .bind(order.currency.code())
        .bind(OrderStatus::Processing.to_string())
        .bind(&order.gateway_session_id)
        .bind(&order.gateway_payment_intent)
        .bind(&order.shipping_addr)
        .bind(&order.billing_addr)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) => {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return Ok(OrderOutcome::DuplicateSession);
                }
                return Err(e.into());
            }
        };
        let created = order_from_row(&row)?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, qty, unit_price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(created.id.as_i32())
            .bind(item.product_id.as_i32())
            .bind(item.qty)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(OrderOutcome::Created(created))
    }

    async fn try_decrement_stock(&self, product: ProductId, qty: i32) -> Result<bool, StoreError> {
        // Store-enforced guard: the decrement only happens when enough stock
        // remains, so concurrent checkouts cannot drive stock negative.
        let result = sqlx::query(
            "UPDATE products SET stock = stock - $2, updated_at = NOW() \
             WHERE id = $1 AND stock >= $2",
        )
        .bind(product.as_i32())
        .bind(qty)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_order_status_by_intent(
        &self,
        intent: &str,
        status: OrderStatus,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE gateway_payment_intent = $1")
            .bind(intent)
            .bind(status.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn order_by_session(&self, session_id: &str) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query("SELECT * FROM orders WHERE gateway_session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let row = sqlx::query(
            "INSERT INTO users (email, password_hash, role) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict("email already exists".to_owned());
            }
            StoreError::Database(e)
        })?;
        user_from_row(&row)
    }

    async fn create_booking(
        &self,
        user: UserId,
        scheduled_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Booking, StoreError> {
        let row = sqlx::query(
            "INSERT INTO bookings (user_id, scheduled_at, notes) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user.as_i32())
        .bind(scheduled_at)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        booking_from_row(&row)
    }

    async fn booking_for_user(
        &self,
        id: BookingId,
        user: UserId,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = $1 AND user_id = $2")
            .bind(id.as_i32())
            .bind(user.as_i32())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn create_proposal(&self, proposal: NewProposal) -> Result<Proposal, StoreError> {
        let bom = serde_json::to_value(&proposal.bom).map_err(corrupt("bom"))?;
        let price_range =
            serde_json::to_value(proposal.price_range).map_err(corrupt("price_range"))?;
        let row = sqlx::query(
            "INSERT INTO proposals (user_id, booking_id, bom, labor_hours_est, \
                                    price_range, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(proposal.user_id.as_i32())
        .bind(proposal.booking_id.as_i32())
        .bind(bom)
        .bind(proposal.labor_hours_est)
        .bind(price_range)
        .bind(ProposalStatus::Draft.to_string())
        .bind(proposal.notes)
        .fetch_one(&self.pool)
        .await?;
        proposal_from_row(&row)
    }

    async fn proposals_for_user(&self, user: UserId) -> Result<Vec<Proposal>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM proposals WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user.as_i32())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(proposal_from_row).collect()
    }

    async fn published_kits(&self) -> Result<Vec<Kit>, StoreError> {
        let rows = sqlx::query("SELECT * FROM kits WHERE published ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(kit_from_row).collect()
    }

    async fn kit_by_slug(&self, slug: &str) -> Result<Option<KitDetail>, StoreError> {
        let Some(kit_row) = sqlx::query("SELECT * FROM kits WHERE slug = $1 AND published")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let kit = kit_from_row(&kit_row)?;

        let rows = sqlx::query(
            "SELECT ki.kit_id, ki.product_id, ki.qty, ki.position, p.* \
             FROM kit_items ki JOIN products p ON p.id = ki.product_id \
             WHERE ki.kit_id = $1 ORDER BY ki.position",
        )
        .bind(kit.id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(|row| {
                Ok(KitItemWithProduct {
                    item: KitItem {
                        kit_id: KitId::new(row.try_get("kit_id")?),
                        product_id: ProductId::new(row.try_get("product_id")?),
                        qty: row.try_get("qty")?,
                        position: row.try_get("position")?,
                    },
                    product: product_from_row(row)?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Some(KitDetail { kit, items }))
    }

    async fn upsert_kit(&self, kit: NewKit) -> Result<KitId, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "INSERT INTO kits (slug, title, ecosystem, price_cad, price_usd, \
                               skill_level, includes, faq, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (slug) DO UPDATE SET \
                 title = EXCLUDED.title, ecosystem = EXCLUDED.ecosystem, \
                 price_cad = EXCLUDED.price_cad, price_usd = EXCLUDED.price_usd, \
                 skill_level = EXCLUDED.skill_level, includes = EXCLUDED.includes, \
                 faq = EXCLUDED.faq, published = EXCLUDED.published \
             RETURNING id",
        )
        .bind(&kit.slug)
        .bind(&kit.title)
        .bind(kit.ecosystem.to_string())
        .bind(kit.price_cad)
        .bind(kit.price_usd)
        .bind(kit.skill_level.to_string())
        .bind(&kit.includes)
        .bind(&kit.faq)
        .bind(kit.published)
        .fetch_one(&mut *tx)
        .await?;
        let id = KitId::new(row.try_get("id")?);

        sqlx::query("DELETE FROM kit_items WHERE kit_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        for (position, (product_id, qty)) in kit.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO kit_items (kit_id, product_id, qty, position) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(id.as_i32())
            .bind(product_id.as_i32())
            .bind(*qty)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn published_content(
        &self,
        content_type: Option<ContentType>,
    ) -> Result<Vec<Content>, StoreError> {
        let rows = match content_type {
            Some(t) => {
                sqlx::query(
                    "SELECT * FROM content WHERE published AND content_type = $1 ORDER BY id",
                )
                .bind(t.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM content WHERE published ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(content_from_row).collect()
    }

    async fn content_by_slug(&self, slug: &str) -> Result<Option<Content>, StoreError> {
        let row = sqlx::query("SELECT * FROM content WHERE slug = $1 AND published")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(content_from_row).transpose()
    }

    async fn upsert_content(&self, content: NewContent) -> Result<ContentId, StoreError> {
        let row = sqlx::query(
            "INSERT INTO content (slug, content_type, title, body, seo_title, \
                                  seo_description, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (slug) DO UPDATE SET \
                 content_type = EXCLUDED.content_type, title = EXCLUDED.title, \
                 body = EXCLUDED.body, seo_title = EXCLUDED.seo_title, \
                 seo_description = EXCLUDED.seo_description, \
                 published = EXCLUDED.published \
             RETURNING id",
        )
        .bind(&content.slug)
        .bind(content.content_type.to_string())
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.seo_title)
        .bind(&content.seo_description)
        .bind(content.published)
        .fetch_one(&self.pool)
        .await?;
        Ok(ContentId::new(row.try_get("id")?))
    }

    async fn all_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(product_from_row).collect()
    }

    async fn update_product_prices(
        &self,
        id: ProductId,
        price_cad: i64,
        price_usd: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE products SET price_cad = $2, price_usd = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(price_cad)
        .bind(price_usd)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_stock(&self, id: ProductId, stock: i32) -> Result<(), StoreError> {
        sqlx::query("UPDATE products SET stock = GREATEST($2, 0), updated_at = NOW() WHERE id = $1")
            .bind(id.as_i32())
            .bind(stock)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_published(&self, id: ProductId, published: bool) -> Result<(), StoreError> {
        sqlx::query("UPDATE products SET published = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.as_i32())
            .bind(published)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_category(
        &self,
        name: &str,
        parent: Option<&str>,
        description: Option<&str>,
    ) -> Result<CategoryId, StoreError> {
        // Resolve (or create) the parent as a top-level category first.
        let parent_id = match parent {
            Some(parent_name) => {
                let row = sqlx::query(
                    "INSERT INTO categories (name, parent_id, description) \
                     VALUES ($1, NULL, NULL) \
                     ON CONFLICT (name, parent_id) DO UPDATE SET name = EXCLUDED.name \
                     RETURNING id",
                )
                .bind(parent_name)
                .fetch_one(&self.pool)
                .await?;
                Some(row.try_get::<i32, _>("id")?)
            }
            None => None,
        };

        let row = sqlx::query(
            "INSERT INTO categories (name, parent_id, description) VALUES ($1, $2, $3) \
             ON CONFLICT (name, parent_id) DO UPDATE SET \
                 description = COALESCE(EXCLUDED.description, categories.description) \
             RETURNING id",
        )
        .bind(name)
        .bind(parent_id)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(CategoryId::new(row.try_get("id")?))
    }

    async fn upsert_product(&self, product: NewProduct) -> Result<ProductId, StoreError> {
        let row = sqlx::query(
            "INSERT INTO products (sku, title, brand, short_desc, long_desc, \
                 price_cad, price_usd, stock, images, protocol, power, room_tags, \
                 beginner_friendly, works_google, works_alexa, works_ha, works_matter, \
                 works_zigbee, works_zwave, works_thread, requires_bridge, published, \
                 category_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                     $15, $16, $17, $18, $19, $20, $21, $22, $23) \
             ON CONFLICT (sku) DO UPDATE SET \
                 title = EXCLUDED.title, brand = EXCLUDED.brand, \
                 short_desc = EXCLUDED.short_desc, long_desc = EXCLUDED.long_desc, \
                 price_cad = EXCLUDED.price_cad, price_usd = EXCLUDED.price_usd, \
                 stock = EXCLUDED.stock, images = EXCLUDED.images, \
                 protocol = EXCLUDED.protocol, power = EXCLUDED.power, \
                 room_tags = EXCLUDED.room_tags, \
                 beginner_friendly = EXCLUDED.beginner_friendly, \
                 works_google = EXCLUDED.works_google, works_alexa = EXCLUDED.works_alexa, \
                 works_ha = EXCLUDED.works_ha, works_matter = EXCLUDED.works_matter, \
                 works_zigbee = EXCLUDED.works_zigbee, works_zwave = EXCLUDED.works_zwave, \
                 works_thread = EXCLUDED.works_thread, \
                 requires_bridge = EXCLUDED.requires_bridge, \
                 published = EXCLUDED.published, category_id = EXCLUDED.category_id, \
                 updated_at = NOW() \
             RETURNING id",
        )
        .bind(&product.sku)
        .bind(&product.title)
        .bind(&product.brand)
        .bind(&product.short_desc)
        .bind(&product.long_desc)
        .bind(product.price_cad)
        .bind(product.price_usd)
        .bind(product.stock)
        .bind(&product.images)
        .bind(&product.protocol)
        .bind(&product.power)
        .bind(&product.room_tags)
        .bind(product.beginner_friendly)
        .bind(product.compat.google)
        .bind(product.compat.alexa)
        .bind(product.compat.ha)
        .bind(product.compat.matter)
        .bind(product.compat.zigbee)
        .bind(product.compat.zwave)
        .bind(product.compat.thread)
        .bind(&product.requires_bridge)
        .bind(product.published)
        .bind(product.category_id.as_i32())
        .fetch_one(&self.pool)
        .await?;
        Ok(ProductId::new(row.try_get("id")?))
    }
}
