//! Address book repository.
//!
//! At most one address per kind is the default; marking a new default clears
//! the flag on the user's other addresses of the same kind in the same
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use fitment_forge_core::{AddressId, AddressKind, UserId};

use super::RepositoryError;
use crate::models::{Address, AddressInput};

/// Saved addresses.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// All addresses for a user, defaults first.
    async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError>;

    /// Save a new address.
    async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError>;

    /// Replace an address the user owns. `None` if it does not exist.
    async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Option<Address>, RepositoryError>;

    /// Delete an address the user owns. Returns whether a row was removed.
    async fn delete(&self, user_id: UserId, id: AddressId) -> Result<bool, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: Uuid,
    user_id: Uuid,
    #[sqlx(rename = "type")]
    kind: String,
    first_name: String,
    last_name: String,
    company: Option<String>,
    address_line_1: String,
    address_line_2: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: String,
    phone: Option<String>,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AddressRow> for Address {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let kind: AddressKind = row.kind.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("address {}: {e}", row.id))
        })?;

        Ok(Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            kind,
            first_name: row.first_name,
            last_name: row.last_name,
            company: row.company,
            address_line_1: row.address_line_1,
            address_line_2: row.address_line_2,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            country: row.country,
            phone: row.phone,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ADDRESS_COLUMNS: &str = "id, user_id, type, first_name, last_name, company, \
     address_line_1, address_line_2, city, state, postal_code, country, phone, \
     is_default, created_at, updated_at";

/// `PostgreSQL`-backed address store.
#[derive(Clone)]
pub struct PgAddressStore {
    pool: PgPool,
}

impl PgAddressStore {
    /// Create a new address store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn clear_defaults(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    kind: AddressKind,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE storefront.addresses
        SET is_default = FALSE
        WHERE user_id = $1 AND type = $2 AND is_default
        ",
    )
    .bind(user_id)
    .bind(kind.as_str())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl AddressStore for PgAddressStore {
    async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM storefront.addresses \
             WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Address::try_from).collect()
    }

    async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if input.is_default {
            clear_defaults(&mut tx, user_id, input.kind).await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "INSERT INTO storefront.addresses \
             (user_id, type, first_name, last_name, company, address_line_1, address_line_2, \
              city, state, postal_code, country, phone, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(input.kind.as_str())
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.company.as_deref())
        .bind(&input.address_line_1)
        .bind(input.address_line_2.as_deref())
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(input.phone.as_deref())
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.try_into()
    }

    async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Option<Address>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if input.is_default {
            clear_defaults(&mut tx, user_id, input.kind).await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "UPDATE storefront.addresses SET \
             type = $3, first_name = $4, last_name = $5, company = $6, \
             address_line_1 = $7, address_line_2 = $8, city = $9, state = $10, \
             postal_code = $11, country = $12, phone = $13, is_default = $14, \
             updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(input.kind.as_str())
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.company.as_deref())
        .bind(&input.address_line_1)
        .bind(input.address_line_2.as_deref())
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(input.phone.as_deref())
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await?;

        // Roll back the default reset when the address was not ours.
        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        tx.commit().await?;
        row.try_into().map(Some)
    }

    async fn delete(&self, user_id: UserId, id: AddressId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM storefront.addresses
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
