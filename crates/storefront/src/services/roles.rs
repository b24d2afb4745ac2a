//! Role assignment.
//!
//! The only path by which a user gains elevated privileges. Assignment is
//! idempotent: a user who already holds any role is left as is.

use fitment_forge_core::{AppRole, UserId};

use crate::db::{RepositoryError, RoleStore};
use crate::models::UserRole;

/// Outcome of [`assign_role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleAssignment {
    /// A new role row was written.
    Assigned(UserRole),
    /// The user already had a role; nothing was written.
    AlreadySet,
}

/// Grant `role` to `user_id` unless the user already holds a role.
///
/// # Errors
///
/// Returns an error if the role store fails.
pub async fn assign_role(
    roles: &dyn RoleStore,
    user_id: UserId,
    role: AppRole,
) -> Result<RoleAssignment, RepositoryError> {
    if roles.find_by_user(user_id).await?.is_some() {
        tracing::info!(%user_id, %role, "Role already set");
        return Ok(RoleAssignment::AlreadySet);
    }

    match roles.insert(user_id, role).await {
        Ok(row) => {
            tracing::info!(%user_id, %role, "Role assigned");
            Ok(RoleAssignment::Assigned(row))
        }
        // Lost a race with a concurrent assignment of the same role.
        Err(RepositoryError::Conflict(_)) => Ok(RoleAssignment::AlreadySet),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryRoleStore;

    #[tokio::test]
    async fn test_assign_is_idempotent() {
        let store = MemoryRoleStore::default();
        let user = UserId::generate();

        let first = assign_role(&store, user, AppRole::Admin).await.unwrap();
        let RoleAssignment::Assigned(row) = first else {
            panic!("expected a new role row");
        };
        assert_eq!(row.user_id, user);
        assert_eq!(row.role, AppRole::Admin);

        assert_eq!(
            assign_role(&store, user, AppRole::Admin).await.unwrap(),
            RoleAssignment::AlreadySet
        );
    }

    #[tokio::test]
    async fn test_any_existing_role_counts() {
        let store = MemoryRoleStore::default();
        let user = UserId::generate();
        assign_role(&store, user, AppRole::User).await.unwrap();

        assert_eq!(
            assign_role(&store, user, AppRole::Admin).await.unwrap(),
            RoleAssignment::AlreadySet
        );
        assert!(!store.has_role(user, AppRole::Admin).await.unwrap());
    }
}
