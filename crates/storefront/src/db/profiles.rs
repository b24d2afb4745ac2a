//! Profile repository.
//!
//! The profile row also carries the signed-in visitor's saved vehicle as a
//! JSON mirror of the fitment selection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use fitment_forge_core::{UserId, Vehicle};

use super::RepositoryError;
use crate::models::{Profile, ProfileUpdate};

/// Per-user profile rows.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a user's profile.
    async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError>;

    /// Create the profile row written at sign-up.
    async fn create(
        &self,
        user_id: UserId,
        first_name: Option<&str>,
        last_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Profile, RepositoryError>;

    /// Apply an edit. Fields left as `None` keep their stored value.
    async fn update(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, RepositoryError>;

    /// Replace (or clear) the saved vehicle.
    async fn set_saved_vehicle(
        &self,
        user_id: UserId,
        vehicle: Option<&Vehicle>,
    ) -> Result<(), RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    avatar_url: Option<String>,
    saved_vehicle: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        // A mirror that no longer decodes is dropped rather than failing the
        // whole profile read.
        let saved_vehicle = row.saved_vehicle.and_then(|value| {
            serde_json::from_value(value)
                .inspect_err(|e| {
                    tracing::warn!(user_id = %row.id, error = %e, "Ignoring invalid saved vehicle");
                })
                .ok()
        });

        Self {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            avatar_url: row.avatar_url,
            saved_vehicle,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL`-backed profile store.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    /// Create a new profile store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, first_name, last_name, phone, avatar_url, saved_vehicle,
                   created_at, updated_at
            FROM storefront.profiles
            WHERE id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn create(
        &self,
        user_id: UserId,
        first_name: Option<&str>,
        last_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO storefront.profiles (id, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, phone, avatar_url, saved_vehicle,
                      created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            UPDATE storefront.profiles
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, first_name, last_name, phone, avatar_url, saved_vehicle,
                      created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.phone.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn set_saved_vehicle(
        &self,
        user_id: UserId,
        vehicle: Option<&Vehicle>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.profiles
            SET saved_vehicle = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user_id)
        .bind(vehicle.map(Json))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
