//! Per-visitor key/value cache.
//!
//! Holds the guest cart token and the serialized vehicle selection. In the
//! HTTP server this is the visitor's session; tests use [`MemoryCache`].

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_sessions::Session;

/// Errors from reading or writing the local cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// String key/value storage scoped to one visitor.
#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Process-local cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Cache backed by the visitor's `tower-sessions` session.
#[derive(Debug, Clone)]
pub struct SessionCache {
    session: Session,
}

impl SessionCache {
    /// Wrap a request's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl LocalCache for SessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.session.get::<String>(key).await?)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.session.insert(key, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.session.remove::<String>(key).await?;
        Ok(())
    }
}
