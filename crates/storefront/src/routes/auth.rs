//! Authentication route handlers.
//!
//! Password sign-up, sign-in (optionally as an administrator) and sign-out.
//! Every outcome carries a notice; failures carry a destructive one titled
//! after the flow ("Sign in failed", ...).

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::routes::WithNotices;
use crate::services::auth::{AuthAction, AuthService, SignUpDetails};
use crate::state::AppState;

/// Sign-up request.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Sign-in request. `admin` asks for the admin role check.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

/// Newly registered account.
#[derive(Debug, Serialize)]
pub struct SignUpBody {
    pub user: User,
}

/// Session identity after sign-in or sign-out.
#[derive(Debug, Serialize)]
pub struct SessionBody {
    pub user: Option<CurrentUser>,
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    let stores = state.stores();
    AuthService::new(
        stores.users.as_ref(),
        stores.profiles.as_ref(),
        stores.roles.as_ref(),
    )
}

/// Register a new account. The visitor is not signed in.
///
/// POST /api/auth/signup
///
/// # Errors
///
/// Returns an error if the email or password is rejected or the email is
/// already registered.
#[instrument(skip(state, request))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<WithNotices<SignUpBody>> {
    let details = SignUpDetails {
        first_name: request.first_name.as_deref(),
        last_name: request.last_name.as_deref(),
        phone: request.phone.as_deref(),
    };
    let user = auth_service(&state)
        .sign_up(&request.email, &request.password, details)
        .await
        .map_err(|e| AppError::auth(AuthAction::SignUp, e))?;

    Ok(WithNotices::new(
        SignUpBody { user },
        vec![AuthAction::SignUp.success_notice()],
    ))
}

/// Sign in and attach the user to the session.
///
/// POST /api/auth/signin
///
/// # Errors
///
/// Returns 401 for bad credentials and 403 for an admin sign-in by a user
/// without the admin role. No session identity is set in either case.
#[instrument(skip(state, session, request), fields(admin = request.admin, user_id))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SignInRequest>,
) -> Result<WithNotices<SessionBody>> {
    let user = auth_service(&state)
        .sign_in(&request.email, &request.password, request.admin)
        .await
        .map_err(|e| AppError::auth(AuthAction::SignIn, e))?;

    let current = CurrentUser {
        id: user.id,
        email: user.email,
        is_admin: request.admin,
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::auth(AuthAction::SignIn, e.into()))?;

    tracing::Span::current().record("user_id", tracing::field::display(current.id));
    set_sentry_user(&current.id, Some(current.email.as_str()));
    tracing::info!("User signed in");

    Ok(WithNotices::new(
        SessionBody {
            user: Some(current),
        },
        vec![AuthAction::SignIn.success_notice()],
    ))
}

/// Drop the session identity. Guest state in the session is kept.
///
/// POST /api/auth/signout
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(session))]
pub async fn sign_out(session: Session) -> Result<WithNotices<SessionBody>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::auth(AuthAction::SignOut, e.into()))?;
    clear_sentry_user();

    Ok(WithNotices::new(
        SessionBody { user: None },
        vec![AuthAction::SignOut.success_notice()],
    ))
}
