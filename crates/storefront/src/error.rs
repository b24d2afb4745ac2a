//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers should return
//! `Result<T, AppError>`.
//!
//! Error bodies are JSON: `{"error": "...", "notices": [...]}`. Failures the
//! visitor is meant to see (auth, account changes, role assignment) carry a
//! destructive notice; `notices` is omitted otherwise.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::notice::Notice;
use crate::services::account::AccountError;
use crate::services::auth::{AuthAction, AuthError};
use crate::services::cart::CartError;
use crate::services::fitment::FitmentError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Sign-up, sign-in or sign-out failed.
    #[error("Auth error: {source}")]
    Auth {
        action: AuthAction,
        #[source]
        source: AuthError,
    },

    /// A cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A vehicle selection was rejected.
    #[error("Fitment error: {0}")]
    Fitment(#[from] FitmentError),

    /// A profile or address operation failed.
    #[error("Account error ({what}): {source}")]
    Account {
        what: &'static str,
        #[source]
        source: AccountError,
    },

    /// Role assignment failed in the store.
    #[error("Role assignment error: {0}")]
    RoleAssignment(#[source] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap an auth failure with the flow it came from.
    #[must_use]
    pub const fn auth(action: AuthAction, source: AuthError) -> Self {
        Self::Auth { action, source }
    }

    /// Wrap an account failure, e.g. `AppError::account("update profile", e)`.
    #[must_use]
    pub const fn account(what: &'static str, source: AccountError) -> Self {
        Self::Account { what, source }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::RoleAssignment(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth { source, .. } => match source {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::NotAdmin => StatusCode::FORBIDDEN,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Session(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Account { source, .. } => match source {
                AccountError::MissingFields(_) => StatusCode::BAD_REQUEST,
                AccountError::NotFound => StatusCode::NOT_FOUND,
                AccountError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Cart(_) | Self::Fitment(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth { source, .. } => {
                if source.is_client_error() {
                    source.to_string()
                } else {
                    "An unknown error occurred".to_string()
                }
            }
            Self::Account { what, source } => match source {
                AccountError::Repository(_) => format!("Failed to {what}."),
                other => format!("Failed to {what}: {other}"),
            },
            Self::RoleAssignment(_) => "Failed to assign role".to_string(),
            Self::Cart(e) => e.to_string(),
            Self::Fitment(e) => e.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::RateLimited => "Too many requests, please try again later".to_string(),
        }
    }

    /// Notice shown to the visitor, for failures they are meant to see.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Auth { action, .. } => Some(Notice::destructive(
                action.failure_title(),
                self.public_message(),
            )),
            Self::Account { .. } | Self::RoleAssignment(_) => {
                Some(Notice::destructive("Error", self.public_message()))
            }
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notices: Vec<Notice>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.public_message(),
            notices: self.notice().into_iter().collect(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("address".to_string());
        assert_eq!(err.to_string(), "Not found: address");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("test".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("test".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::BadRequest("test".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AppError::Internal("test".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::auth(AuthAction::SignIn, AuthError::NotAdmin).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_auth_failure_carries_notice() {
        let (status, body) =
            body_json(AppError::auth(AuthAction::SignIn, AuthError::NotAdmin)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["notices"][0]["title"], "Sign in failed");
        assert_eq!(
            body["notices"][0]["description"],
            "You do not have administrative privileges."
        );
        assert_eq!(body["notices"][0]["variant"], "destructive");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) =
            body_json(AppError::Database(RepositoryError::DataCorruption("secret".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("notices").is_none());
    }

    #[tokio::test]
    async fn test_account_failure_message() {
        let (status, body) = body_json(AppError::account(
            "save address",
            AccountError::MissingFields(vec!["city"]),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Failed to save address: missing required fields: city"
        );
        assert_eq!(body["notices"][0]["title"], "Error");
    }
}
