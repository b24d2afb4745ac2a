//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Stores;
use crate::services::fitment::FitmentCatalog;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the row stores, the fitment catalog and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    stores: Stores,
    catalog: FitmentCatalog,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `stores` - Row stores (`PostgreSQL` in production, in-memory in tests)
    /// * `catalog` - Fitment reference data
    #[must_use]
    pub fn new(config: StorefrontConfig, stores: Stores, catalog: FitmentCatalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the row stores.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get the fitment catalog.
    #[must_use]
    pub fn catalog(&self) -> FitmentCatalog {
        self.inner.catalog
    }
}
