//! Cart rows keyed by guest session or user.
//!
//! A guest row is matched on `session_id` with `user_id IS NULL`; a user row
//! on `user_id`. Writes are plain upserts with no version check, so the last
//! completed write wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use fitment_forge_core::{CartId, CartLine, CartOwner, GuestSessionId, UserId};

use super::RepositoryError;

/// A cart as stored in the row store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCart {
    pub id: CartId,
    pub owner: CartOwner,
    pub lines: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}

/// Durable row store for carts.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Fetch the cart row for an owner, if one exists.
    async fn get(&self, owner: &CartOwner) -> Result<Option<StoredCart>, RepositoryError>;

    /// Insert or replace the cart row for an owner.
    async fn upsert(
        &self,
        owner: &CartOwner,
        lines: &[CartLine],
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Option<Uuid>,
    session_id: Option<Uuid>,
    items: Option<serde_json::Value>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for StoredCart {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let owner = match (row.user_id, row.session_id) {
            (Some(user_id), _) => CartOwner::User(UserId::new(user_id)),
            (None, Some(session_id)) => CartOwner::Guest(GuestSessionId::new(session_id)),
            (None, None) => {
                return Err(RepositoryError::DataCorruption(format!(
                    "cart {} has neither user_id nor session_id",
                    row.id
                )));
            }
        };

        let lines = match row.items {
            Some(items) => serde_json::from_value(items).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid cart items in {}: {e}", row.id))
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            id: CartId::new(row.id),
            owner,
            lines,
            updated_at: row.updated_at,
        })
    }
}

/// `PostgreSQL`-backed cart store.
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Create a new cart store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn get(&self, owner: &CartOwner) -> Result<Option<StoredCart>, RepositoryError> {
        let row = match owner {
            CartOwner::User(user_id) => {
                sqlx::query_as::<_, CartRow>(
                    r"
                    SELECT id, user_id, session_id, items, updated_at
                    FROM storefront.carts
                    WHERE user_id = $1
                    ORDER BY updated_at DESC
                    LIMIT 1
                    ",
                )
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
            }
            CartOwner::Guest(session_id) => {
                sqlx::query_as::<_, CartRow>(
                    r"
                    SELECT id, user_id, session_id, items, updated_at
                    FROM storefront.carts
                    WHERE session_id = $1 AND user_id IS NULL
                    ORDER BY updated_at DESC
                    LIMIT 1
                    ",
                )
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        row.map(StoredCart::try_from).transpose()
    }

    async fn upsert(
        &self,
        owner: &CartOwner,
        lines: &[CartLine],
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        match owner {
            CartOwner::User(user_id) => {
                sqlx::query(
                    r"
                    INSERT INTO storefront.carts (user_id, session_id, items, updated_at)
                    VALUES ($1, NULL, $2, $3)
                    ON CONFLICT (user_id)
                    DO UPDATE SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at
                    ",
                )
                .bind(user_id)
                .bind(Json(lines))
                .bind(updated_at)
                .execute(&self.pool)
                .await?;
            }
            CartOwner::Guest(session_id) => {
                sqlx::query(
                    r"
                    INSERT INTO storefront.carts (user_id, session_id, items, updated_at)
                    VALUES (NULL, $1, $2, $3)
                    ON CONFLICT (session_id)
                    DO UPDATE SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at
                    ",
                )
                .bind(session_id)
                .bind(Json(lines))
                .bind(updated_at)
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(())
    }
}
