//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Store connectivity + catalog counts
//!
//! # Catalog
//! GET  /catalog                 - Filtered, paginated product listing
//! GET  /products/{id}           - Product detail + related products
//! GET  /kits                    - Published kit bundles
//! GET  /kits/{slug}             - Kit detail with contents
//! GET  /content                 - Published editorial content
//! GET  /content/{slug}          - Content detail
//!
//! # Cart (requires auth)
//! GET  /cart                    - Fetch-or-create the user's cart
//! POST /cart                    - Same as GET (explicit create)
//! POST /cart/items              - Add a product (quantity merge)
//! PATCH  /cart/items/{id}       - Change quantity (stock-validated)
//! DELETE /cart/items/{id}       - Remove a line
//!
//! # Checkout
//! POST /checkout/session        - Create a hosted checkout session
//! POST /webhooks/payment        - Gateway webhook (signature-verified)
//!
//! # Consultations (requires auth)
//! POST /bookings                - Book a consultation slot
//! GET  /proposals               - Own proposals, newest first
//! POST /proposals               - Price a bill of materials
//!
//! # AI
//! POST /ai/recommendations      - Product recommendations
//! POST /ai/generate-content     - Editorial draft generation (admin)
//!
//! # Auth
//! POST /auth/register           - Create account + session
//! POST /auth/login              - Open session
//! POST /auth/logout             - Close session
//!
//! # Admin (ADMIN session + x-admin-key header)
//! POST /admin/update-data       - Full maintenance run
//! POST /admin/update-prices     - Targeted maintenance run
//! ```

pub mod admin;
pub mod ai;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod health;
pub mod kits;
pub mod products;
pub mod proposals;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::ai::TextGenerator;
use crate::gateway::PaymentGateway;
use crate::state::AppState;
use crate::store::Store;

/// Create the cart routes router.
pub fn cart_routes<S, G, T>() -> Router<AppState<S, G, T>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    Router::new()
        .route("/", get(cart::show).post(cart::show))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            axum::routing::patch(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the AI routes router.
pub fn ai_routes<S, G, T>() -> Router<AppState<S, G, T>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    Router::new()
        .route("/recommendations", post(ai::recommendations))
        .route("/generate-content", post(ai::generate_content))
}

/// Create the auth routes router.
pub fn auth_routes<S, G, T>() -> Router<AppState<S, G, T>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes<S, G, T>() -> Router<AppState<S, G, T>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    Router::new()
        .route("/update-data", post(admin::update_data))
        .route("/update-prices", post(admin::update_prices))
}

/// Create all routes for the storefront.
pub fn routes<S, G, T>() -> Router<AppState<S, G, T>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/catalog", get(catalog::index))
        .route("/products/{id}", get(products::show))
        .route("/kits", get(kits::index))
        .route("/kits/{slug}", get(kits::show))
        .route("/content", get(content::index))
        .route("/content/{slug}", get(content::show))
        .nest("/cart", cart_routes())
        .route("/checkout/session", post(checkout::create_session))
        .route("/webhooks/payment", post(webhooks::payment))
        .route("/bookings", post(proposals::create_booking))
        .route(
            "/proposals",
            get(proposals::index).post(proposals::create),
        )
        .nest("/ai", ai_routes())
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}
