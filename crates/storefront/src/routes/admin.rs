//! Service-key admin routes.
//!
//! `POST /api/admin/roles` grants a role to a user. It is called by back
//! office tooling holding the service role key, never by a signed-in
//! visitor, so it does not look at the session.

use axum::{
    Json,
    extract::State,
    http::{
        HeaderMap, HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::instrument;

use fitment_forge_core::{AppRole, UserId};

use crate::error::{AppError, Result};
use crate::services::roles::{RoleAssignment, assign_role as assign};
use crate::state::AppState;

/// Role assignment request. Both fields are required; the camelCase
/// `userId` spelling is accepted too.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
    pub role: Option<String>,
}

/// CORS for the role endpoint: `POST` and preflight from one origin.
///
/// `"*"` allows any origin; no origin configured allows none.
#[must_use]
pub fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let origin = match allowed_origin {
        Some("*") => AllowOrigin::any(),
        Some(origin) => AllowOrigin::list(HeaderValue::from_str(origin).ok()),
        None => AllowOrigin::list(Vec::<HeaderValue>::new()),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn check_service_key(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let expected = state.config().service_role_key.expose_secret().as_bytes();
    match bearer_token(headers) {
        Some(token) if bool::from(token.as_bytes().ct_eq(expected)) => Ok(()),
        Some(_) => Err(AppError::Unauthorized("Invalid service key".to_string())),
        None => Err(AppError::Unauthorized(
            "Missing authorization header".to_string(),
        )),
    }
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

/// Grant a role unless the user already holds one.
///
/// POST /api/admin/roles
///
/// Responds `{"data":[row]}` for a new assignment and
/// `{"data":{"message":"Role already set"}}` otherwise.
///
/// # Errors
///
/// Returns 401 without a valid service key, 400 for missing or malformed
/// fields and 500 if the role store fails.
#[instrument(skip(state, headers, request))]
pub async fn assign_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AssignRoleRequest>,
) -> Result<Json<Value>> {
    check_service_key(&state, &headers)?;

    let (Some(user_id), Some(role)) = (required(request.user_id), required(request.role)) else {
        return Err(AppError::BadRequest(
            "User ID and role are required".to_string(),
        ));
    };
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))?;
    let role: AppRole = role
        .parse()
        .map_err(|e: fitment_forge_core::AppRoleError| AppError::BadRequest(e.to_string()))?;

    let outcome = assign(state.stores().roles.as_ref(), user_id, role)
        .await
        .map_err(AppError::RoleAssignment)?;

    let body = match outcome {
        RoleAssignment::Assigned(row) => json!({ "data": [row] }),
        RoleAssignment::AlreadySet => json!({ "data": { "message": "Role already set" } }),
    };
    Ok(Json(body))
}
