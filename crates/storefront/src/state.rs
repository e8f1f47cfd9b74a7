//! Application state shared across handlers.

use std::sync::Arc;

use crate::ai::TextGenerator;
use crate::config::StorefrontConfig;
use crate::gateway::PaymentGateway;
use crate::store::Store;

/// Application state shared across all handlers.
///
/// Generic over the store, payment gateway, and text generator so tests can
/// run the full router against in-memory fakes. This struct is cheaply
/// cloneable via `Arc` and provides access to shared resources.
pub struct AppState<S, G, T> {
    inner: Arc<AppStateInner<S, G, T>>,
}

impl<S, G, T> Clone for AppState<S, G, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<S, G, T> {
    config: StorefrontConfig,
    store: S,
    gateway: G,
    generator: T,
}

impl<S, G, T> AppState<S, G, T>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    /// Create a new application state.
    pub fn new(config: StorefrontConfig, store: S, gateway: G, generator: T) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                gateway,
                generator,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    /// Get a reference to the text generator.
    #[must_use]
    pub fn generator(&self) -> &T {
        &self.inner.generator
    }
}
