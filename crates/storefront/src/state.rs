//! Application state shared across handlers.

use std::sync::Arc;

use panier_core::CheckoutPolicy;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::services::PaymentHandlers;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Everything in it is read-only
/// after startup; per-visitor data lives in the session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    payments: PaymentHandlers,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Products on offer
    /// * `payments` - Handlers behind the payment buttons
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog, payments: PaymentHandlers) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                payments,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Checkout rules from the configuration.
    #[must_use]
    pub fn policy(&self) -> CheckoutPolicy {
        self.inner.config.checkout
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn payments(&self) -> &PaymentHandlers {
        &self.inner.payments
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("products", &self.inner.catalog.len())
            .field("payments", &self.inner.payments)
            .finish_non_exhaustive()
    }
}
