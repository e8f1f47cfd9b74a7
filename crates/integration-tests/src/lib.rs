//! Integration test harness for Homegrid.
//!
//! Boots the real router on an ephemeral port against the in-memory store,
//! a fake payment gateway and a canned text generator, then drives it with
//! a cookie-holding `reqwest` client. No external services are required.
//!
//! ```bash
//! cargo test -p homegrid-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU32, Ordering};

use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use homegrid_core::{CategoryId, UserRole};
use homegrid_storefront::ai::{AiError, TextGenerator};
use homegrid_storefront::config::{JobSettings, StorefrontConfig, StripeConfig};
use homegrid_storefront::gateway::{
    CheckoutSession, GatewayError, PaymentGateway, SessionRequest,
};
use homegrid_storefront::models::{Compatibility, NewProduct, Product};
use homegrid_storefront::routes;
use homegrid_storefront::state::AppState;
use homegrid_storefront::store::{MemStore, Store};

/// Webhook signing secret the test app is configured with.
pub const WEBHOOK_SECRET: &str = "whsec_integration_test_secret";

/// Admin key the test app is configured with.
pub const ADMIN_KEY: &str = "integration-test-admin-key";

/// Payment gateway fake: returns sequential session ids, never fails.
#[derive(Default)]
pub struct FakeGateway {
    counter: AtomicU32,
}

impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        _request: SessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CheckoutSession {
            id: format!("cs_test_{n}"),
            url: format!("https://gateway.test/session/cs_test_{n}"),
        })
    }
}

/// Text generator fake that always returns the same completion.
pub struct CannedGenerator(pub String);

impl CannedGenerator {
    /// A generator whose output never parses as recommendations, forcing
    /// the keyword fallback.
    #[must_use]
    pub fn unparseable() -> Self {
        Self("I'd be happy to help you choose!".to_owned())
    }
}

impl TextGenerator for CannedGenerator {
    async fn generate(
        &self,
        _system: &str,
        _user: &str,
        _max_tokens: u32,
    ) -> Result<String, AiError> {
        Ok(self.0.clone())
    }
}

/// Text generator fake whose calls always fail, as if the model were down.
pub struct FailingGenerator;

impl TextGenerator for FailingGenerator {
    async fn generate(
        &self,
        _system: &str,
        _user: &str,
        _max_tokens: u32,
    ) -> Result<String, AiError> {
        Err(AiError::Api {
            status: 503,
            message: "model overloaded".to_owned(),
        })
    }
}

fn test_config(port: u16) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port,
        base_url: format!("http://127.0.0.1:{port}"),
        session_secret: SecretString::from("an-integration-test-session-secret"),
        stripe: StripeConfig {
            secret_key: SecretString::from("sk_test_unused"),
            webhook_secret: SecretString::from(WEBHOOK_SECRET),
            webhook_tolerance_secs: 300,
        },
        openai: None,
        admin_api_key: SecretString::from(ADMIN_KEY),
        jobs: JobSettings { simulate: false },
        sentry_dsn: None,
    }
}

/// A running storefront instance backed by in-memory fakes.
pub struct TestApp {
    /// `http://127.0.0.1:{port}`
    pub base_url: String,
    /// Cookie-holding client; one login session per `TestApp`.
    pub client: reqwest::Client,
    /// Shared handle to the app's store, for seeding and assertions.
    pub store: MemStore,
}

impl TestApp {
    /// Boot the full router on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics when the port cannot be bound; tests have no recovery path.
    pub async fn spawn() -> Self {
        Self::spawn_with_generator(CannedGenerator::unparseable()).await
    }

    /// Boot with a specific text generator fake.
    ///
    /// # Panics
    ///
    /// Panics when the port cannot be bound.
    pub async fn spawn_with_generator<T: TextGenerator>(generator: T) -> Self {
        let store = MemStore::new();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let port = listener.local_addr().expect("local addr").port();

        let state = AppState::new(
            test_config(port),
            store.clone(),
            FakeGateway::default(),
            generator,
        );

        let session_layer = SessionManagerLayer::new(MemoryStore::default())
            .with_name("hg_session")
            .with_secure(false);

        let app = routes::routes()
            .layer(session_layer)
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("build client");

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            client,
            store,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Create an admin account in the store and log it in; the session
    /// cookie sticks to `self.client`. Admin routes additionally want the
    /// [`ADMIN_KEY`] header.
    ///
    /// # Panics
    ///
    /// Panics when the store writes or the login request fail.
    pub async fn login_admin(&self, email: &str, password: &str) {
        let hash = homegrid_storefront::auth::hash_password(password).expect("hash password");
        self.store
            .create_user(email, &hash, UserRole::Admin)
            .await
            .expect("create admin user");
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request");
        assert_eq!(resp.status(), 200, "admin login failed");
    }

    /// Register a user; the session cookie sticks to `self.client`.
    ///
    /// # Panics
    ///
    /// Panics when the request fails or is rejected.
    pub async fn register(&self, email: &str, password: &str) {
        let resp = self
            .client
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("register request");
        assert_eq!(resp.status(), 201, "registration failed");
    }
}

/// A published product fixture.
#[must_use]
pub fn sample_product(
    sku: &str,
    category_id: CategoryId,
    price_cad: i64,
    stock: i32,
) -> NewProduct {
    NewProduct {
        sku: sku.to_owned(),
        title: format!("Product {sku}"),
        brand: "Aqara".to_owned(),
        short_desc: "A compact zigbee sensor".to_owned(),
        long_desc: "A compact zigbee sensor with long battery life".to_owned(),
        price_cad,
        price_usd: price_cad * 4 / 5,
        stock,
        images: vec![format!("/images/{sku}.jpg")],
        protocol: "zigbee".to_owned(),
        power: Some("battery".to_owned()),
        room_tags: vec!["bedroom".to_owned()],
        beginner_friendly: true,
        compat: Compatibility {
            google: true,
            alexa: true,
            ha: true,
            zigbee: true,
            ..Compatibility::default()
        },
        requires_bridge: vec![],
        published: true,
        category_id,
    }
}

/// Seed one category and one published product; returns the stored product.
///
/// # Panics
///
/// Panics when the store rejects the writes.
pub async fn seed_product(store: &MemStore, sku: &str, price_cad: i64, stock: i32) -> Product {
    let category = store
        .upsert_category("Sensors", None, None)
        .await
        .expect("upsert category");
    store
        .upsert_product(sample_product(sku, category, price_cad, stock))
        .await
        .expect("upsert product");
    store
        .product_by_sku(sku)
        .await
        .expect("fetch product")
        .expect("product exists")
}

/// Sign a webhook body the way the gateway does.
///
/// # Panics
///
/// Never; HMAC accepts any key length.
#[must_use]
pub fn sign_webhook(body: &str, timestamp: i64) -> String {
    let payload = format!("{timestamp}.{body}");
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes())
        .expect("hmac accepts any key length");
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
}

/// A `checkout.session.completed` webhook body for the given cart.
#[must_use]
pub fn checkout_completed_body(
    session_id: &str,
    payment_intent: &str,
    cart_id: i32,
    user_id: i32,
    amount_total: i64,
) -> String {
    serde_json::json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "payment_intent": payment_intent,
                "amount_total": amount_total,
                "currency": "cad",
                "metadata": {
                    "cart_id": cart_id.to_string(),
                    "user_id": user_id.to_string(),
                },
                "shipping_details": { "name": "Test Shopper" },
                "customer_details": { "email": "shopper@example.com" },
            }
        }
    })
    .to_string()
}
