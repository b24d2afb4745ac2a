//! Role membership repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use fitment_forge_core::{AppRole, RoleId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::UserRole;

/// Role rows in `user_roles`.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Whether the user holds exactly this role.
    async fn has_role(&self, user_id: UserId, role: AppRole) -> Result<bool, RepositoryError>;

    /// Any role row the user holds.
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<UserRole>, RepositoryError>;

    /// Insert a role row.
    ///
    /// Returns [`RepositoryError::Conflict`] if the pair already exists.
    async fn insert(&self, user_id: UserId, role: AppRole) -> Result<UserRole, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct UserRoleRow {
    id: Uuid,
    user_id: Uuid,
    role: AppRole,
}

impl From<UserRoleRow> for UserRole {
    fn from(row: UserRoleRow) -> Self {
        Self {
            id: RoleId::new(row.id),
            user_id: UserId::new(row.user_id),
            role: row.role,
        }
    }
}

/// `PostgreSQL`-backed role store.
#[derive(Clone)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    /// Create a new role store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn has_role(&self, user_id: UserId, role: AppRole) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM storefront.user_roles WHERE user_id = $1 AND role = $2
            )
            ",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<UserRole>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r"
            SELECT id, user_id, role
            FROM storefront.user_roles
            WHERE user_id = $1
            LIMIT 1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRole::from))
    }

    async fn insert(&self, user_id: UserId, role: AppRole) -> Result<UserRole, RepositoryError> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r"
            INSERT INTO storefront.user_roles (user_id, role)
            VALUES ($1, $2)
            RETURNING id, user_id, role
            ",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "role"))?;

        Ok(row.into())
    }
}
