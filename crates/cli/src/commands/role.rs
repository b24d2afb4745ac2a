//! Role management commands.
//!
//! # Usage
//!
//! ```bash
//! ff-cli role assign --user-id 6f1c...-... --role admin
//! ```
//!
//! Same rules as `POST /api/admin/roles`: a user who already holds a role
//! is left unchanged.

use fitment_forge_core::{AppRole, UserId};
use fitment_forge_storefront::db::{PgRoleStore, create_pool};
use fitment_forge_storefront::services::roles::{RoleAssignment, assign_role};

use super::{CommandError, database_url};

/// Assign `role` to the user with ID `user_id`.
///
/// # Errors
///
/// Returns an error if the arguments do not parse or the database fails.
pub async fn assign(user_id: &str, role: &str) -> Result<RoleAssignment, CommandError> {
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| CommandError::InvalidArgument(format!("Invalid user ID: {user_id}")))?;
    let role: AppRole = role
        .parse()
        .map_err(|e: fitment_forge_core::AppRoleError| CommandError::InvalidArgument(e.to_string()))?;

    let pool = create_pool(&database_url()?).await?;
    let store = PgRoleStore::new(pool);

    let outcome = assign_role(&store, user_id, role).await?;
    match &outcome {
        RoleAssignment::Assigned(row) => {
            tracing::info!(role_id = %row.id, "Assigned {} to {}", row.role, row.user_id);
        }
        RoleAssignment::AlreadySet => tracing::info!("Role already set for {}", user_id),
    }
    Ok(outcome)
}
