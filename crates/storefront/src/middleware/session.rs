//! Session middleware configuration.
//!
//! The session identifies the signed-in user and doubles as the visitor's
//! local cache (guest cart token, vehicle selection). Production uses the
//! `PostgreSQL` store; tests plug in `tower_sessions::MemoryStore`.
//!
//! The session cookie is signed with a key taken from
//! `STOREFRONT_SESSION_SECRET`. A cookie whose signature does not verify is
//! ignored and the visitor starts a fresh session.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::{ConfigError, StorefrontConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ff_session";

/// Session expiry time in seconds (30 days). Guest carts are keyed by a
/// token kept in the session, so this is also how long a guest cart stays
/// reachable between visits.
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// The key that signs the session cookie.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the secret is shorter than the
/// 64 bytes a signing key needs.
pub fn session_key(config: &StorefrontConfig) -> Result<Key, ConfigError> {
    Key::try_from(config.session_secret.expose_secret().as_bytes()).map_err(|e| {
        ConfigError::InsecureSecret("STOREFRONT_SESSION_SECRET".to_string(), e.to_string())
    })
}

/// Create the session layer with `PostgreSQL` store.
///
/// The `tower_sessions.session` table must exist (see migrations).
///
/// # Errors
///
/// Returns `ConfigError` if the session secret cannot be used as a key.
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<PostgresStore, SignedCookie>, ConfigError> {
    let store = PostgresStore::new(pool.clone());
    Ok(session_layer(store, config.is_https(), session_key(config)?))
}

/// Apply the storefront's cookie settings to any session store.
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(
    store: S,
    secure: bool,
    key: Key,
) -> SessionManagerLayer<S, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_signed(key)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
