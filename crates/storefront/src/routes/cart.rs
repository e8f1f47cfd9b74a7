//! Cart route handlers.
//!
//! Everything here is ownership-checked: a cart item belonging to another
//! user 404s rather than 403s, so item ids cannot be probed.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;

use homegrid_core::{CartItemId, Currency, ProductId};

use crate::ai::TextGenerator;
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::middleware::auth::RequireAuth;
use crate::models::{Cart, CartItemView, CartItemWithProduct, CartView, Product};
use crate::state::AppState;
use crate::store::Store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemBody {
    pub product_id: i32,
    #[serde(default = "default_qty")]
    pub qty: i32,
}

const fn default_qty() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemBody {
    pub qty: i32,
}

async fn fetch_or_create_cart<S: Store>(
    store: &S,
    user: homegrid_core::UserId,
) -> Result<Cart> {
    match store.cart_for_user(user).await? {
        Some(cart) => Ok(cart),
        None => Ok(store.create_cart(user, Currency::CAD).await?),
    }
}

/// Fetch-or-create the current user's cart.
pub async fn show<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let cart = fetch_or_create_cart(state.store(), user.id).await?;
    let items = state.store().cart_items(cart.id).await?;
    Ok(Json(json!({ "cart": CartView::assemble(&cart, &items) })))
}

fn check_stock(product: &Product, qty: i32) -> Result<()> {
    if product.stock < qty {
        return Err(AppError::Conflict(format!(
            "Insufficient stock for {}",
            product.title
        )));
    }
    Ok(())
}

/// Add a product to the cart, merging quantity into an existing line.
pub async fn add_item<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddItemBody>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    if body.qty < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_owned()));
    }

    let product_id = ProductId::new(body.product_id);
    let row = state
        .store()
        .product(product_id)
        .await?
        .filter(|row| row.product.published)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
    let product = row.product;

    let cart = fetch_or_create_cart(state.store(), user.id).await?;

    let item = match state.store().find_cart_item(cart.id, product_id).await? {
        Some(existing) => {
            let qty = existing.qty + body.qty;
            check_stock(&product, qty)?;
            state.store().set_cart_item_qty(existing.id, qty).await?
        }
        None => {
            check_stock(&product, body.qty)?;
            let unit_price = match cart.currency {
                Currency::CAD => product.price_cad,
                Currency::USD => product.price_usd,
            };
            state
                .store()
                .insert_cart_item(cart.id, product_id, body.qty, unit_price)
                .await?
        }
    };

    let view = CartItemView::from(&CartItemWithProduct { item, product });
    Ok((StatusCode::CREATED, Json(json!({ "cartItem": view }))))
}

/// Fetch a cart item and confirm the caller owns its cart.
async fn owned_item<S: Store>(
    store: &S,
    item: CartItemId,
    user: homegrid_core::UserId,
) -> Result<crate::models::CartItem> {
    let (item, cart) = store
        .cart_item(item)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_owned()))?;
    if cart.user_id != user {
        return Err(AppError::NotFound("Cart item not found".to_owned()));
    }
    Ok(item)
}

/// Change a cart line's quantity, re-validated against current stock.
pub async fn update_item<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(body): Json<UpdateItemBody>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    if body.qty < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_owned()));
    }

    let item = owned_item(state.store(), CartItemId::new(id), user.id).await?;

    let row = state
        .store()
        .product(item.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
    check_stock(&row.product, body.qty)?;

    let item = state.store().set_cart_item_qty(item.id, body.qty).await?;
    let view = CartItemView::from(&CartItemWithProduct {
        item,
        product: row.product,
    });
    Ok(Json(json!({ "cartItem": view })))
}

/// Remove a cart line.
pub async fn remove_item<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<StatusCode>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let item = owned_item(state.store(), CartItemId::new(id), user.id).await?;
    state.store().delete_cart_item(item.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
