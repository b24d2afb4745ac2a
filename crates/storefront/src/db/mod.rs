//! Durable row store for the storefront.
//!
//! # Database: `fitment_forge`
//!
//! ## Tables (schema `storefront`)
//!
//! - `users` - Password accounts
//! - `user_roles` - Role membership (`admin`, `user`)
//! - `profiles` - Per-user profile, including the saved vehicle
//! - `addresses` - Shipping and billing addresses
//! - `carts` - One row per guest session or per user
//! - `brands`, `categories`, `products` - Catalog shown on the front page
//!
//! Sessions live in `tower_sessions.session`.
//!
//! Each table is reached through a store trait so that the cart manager and
//! services can run against `PostgreSQL` in production and against the
//! in-memory implementations in [`memory`] under test.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p fitment-forge-cli -- migrate
//! ```

pub mod addresses;
pub mod carts;
pub mod catalog;
pub mod memory;
pub mod profiles;
pub mod roles;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::{AddressStore, PgAddressStore};
pub use carts::{CartStore, PgCartStore, StoredCart};
pub use catalog::{CatalogStore, PgCatalogStore};
pub use profiles::{PgProfileStore, ProfileStore};
pub use roles::{PgRoleStore, RoleStore};
pub use users::{PgUserStore, UserStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique violation to [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// The full set of stores the application runs against.
#[derive(Clone)]
pub struct Stores {
    pub carts: Arc<dyn CartStore>,
    pub users: Arc<dyn UserStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub roles: Arc<dyn RoleStore>,
    pub addresses: Arc<dyn AddressStore>,
    pub catalog: Arc<dyn CatalogStore>,
}

impl Stores {
    /// Stores backed by a `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            carts: Arc::new(PgCartStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            profiles: Arc::new(PgProfileStore::new(pool.clone())),
            roles: Arc::new(PgRoleStore::new(pool.clone())),
            addresses: Arc::new(PgAddressStore::new(pool.clone())),
            catalog: Arc::new(PgCatalogStore::new(pool.clone())),
        }
    }

    /// Process-local stores with no persistence.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            carts: Arc::new(memory::MemoryCartStore::default()),
            users: Arc::new(memory::MemoryUserStore::default()),
            profiles: Arc::new(memory::MemoryProfileStore::default()),
            roles: Arc::new(memory::MemoryRoleStore::default()),
            addresses: Arc::new(memory::MemoryAddressStore::default()),
            catalog: Arc::new(memory::MemoryCatalogStore::default()),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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
