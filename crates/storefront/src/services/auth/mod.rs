//! Authentication service.
//!
//! Password sign-up and sign-in over the user, profile and role stores.
//! The session itself is managed by the route handlers.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use fitment_forge_core::{AppRole, Email};

use crate::db::{ProfileStore, RepositoryError, RoleStore, UserStore};
use crate::models::User;
use crate::notice::Notice;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Which auth flow produced a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    SignUp,
    SignIn,
    SignOut,
}

impl AuthAction {
    /// Title of the notice raised when this action fails.
    #[must_use]
    pub const fn failure_title(self) -> &'static str {
        match self {
            Self::SignUp => "Sign up failed",
            Self::SignIn => "Sign in failed",
            Self::SignOut => "Sign out failed",
        }
    }

    /// Notice raised when this action succeeds.
    #[must_use]
    pub fn success_notice(self) -> Notice {
        match self {
            Self::SignUp => Notice::info(
                "Account created",
                "Your account is ready. You can now sign in.",
            ),
            Self::SignIn => Notice::info("Welcome back!", "You have been signed in successfully."),
            Self::SignOut => Notice::info("Signed out", "You have been signed out successfully."),
        }
    }
}

/// Sign-up form fields beyond the credentials.
#[derive(Debug, Clone, Default)]
pub struct SignUpDetails<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone: Option<&'a str>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    profiles: &'a dyn ProfileStore,
    roles: &'a dyn RoleStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        profiles: &'a dyn ProfileStore,
        roles: &'a dyn RoleStore,
    ) -> Self {
        Self {
            users,
            profiles,
            roles,
        }
    }

    /// Register a new user with email and password, and create their profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        details: SignUpDetails<'_>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        self.profiles
            .create(user.id, details.first_name, details.last_name, details.phone)
            .await?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Verify email and password.
    ///
    /// With `admin` set, the user must also hold the admin role; otherwise
    /// the sign-in is refused and no session should be established.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::NotAdmin` for an admin sign-in without the role.
    pub async fn sign_in(&self, email: &str, password: &str, admin: bool) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if admin && !self.roles.has_role(user.id, AppRole::Admin).await? {
            tracing::warn!(user_id = %user.id, "Admin sign-in refused");
            return Err(AuthError::NotAdmin);
        }

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
