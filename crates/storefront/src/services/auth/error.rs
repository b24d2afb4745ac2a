//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] fitment_forge_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("User already registered")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Admin sign-in by a user without the admin role.
    #[error("You do not have administrative privileges.")]
    NotAdmin,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The session could not be updated.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Whether the visitor can fix this by changing their input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_)
                | Self::InvalidCredentials
                | Self::UserAlreadyExists
                | Self::WeakPassword(_)
                | Self::NotAdmin
        )
    }
}
