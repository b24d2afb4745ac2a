//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! # Browsing
//! GET    /api/products/featured      - Featured products (up to 8)
//! GET    /api/categories             - Top-level categories (up to 6)
//!
//! # Cart
//! GET    /api/cart                   - Load the visitor's cart
//! DELETE /api/cart                   - Empty the cart
//! POST   /api/cart/items             - Add a line (merges by product)
//! PATCH  /api/cart/items/{product}   - Set a line's quantity
//! DELETE /api/cart/items/{product}   - Remove a line
//!
//! # Vehicle fitment
//! GET    /api/vehicle                - Current selection
//! PUT    /api/vehicle                - Save a selection
//! DELETE /api/vehicle                - Clear the selection
//! GET    /api/vehicle/catalog        - Years, makes, models and engines
//!
//! # Auth (rate limited)
//! POST   /api/auth/signup            - Register
//! POST   /api/auth/signin            - Sign in (optionally as admin)
//! POST   /api/auth/signout           - Sign out
//!
//! # Account (requires auth)
//! GET    /api/account/profile        - Profile
//! PATCH  /api/account/profile        - Update profile
//! GET    /api/account/addresses      - Address list
//! POST   /api/account/addresses      - Create address
//! PUT    /api/account/addresses/{id} - Replace address
//! DELETE /api/account/addresses/{id} - Delete address
//!
//! # Admin (service key, rate limited, CORS)
//! POST   /api/admin/roles            - Assign a role to a user
//! ```
//!
//! Successful mutations answer with the resource plus a `notices` array.

pub mod account;
pub mod admin;
pub mod auth;
pub mod browse;
pub mod cart;
pub mod vehicle;

use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::Serialize;

use crate::config::StorefrontConfig;
use crate::middleware::{admin_rate_limiter, auth_rate_limiter};
use crate::notice::Notice;
use crate::state::AppState;

/// A JSON body with the notices raised while handling the request.
///
/// `body` is flattened, so it must serialize as a map.
#[derive(Debug, Serialize)]
pub struct WithNotices<T> {
    #[serde(flatten)]
    pub body: T,
    pub notices: Vec<Notice>,
}

impl<T> WithNotices<T> {
    pub const fn new(body: T, notices: Vec<Notice>) -> Self {
        Self { body, notices }
    }
}

impl<T: Serialize> IntoResponse for WithNotices<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Create the browsing routes router.
pub fn browse_routes() -> Router<AppState> {
    Router::new()
        .route("/products/featured", get(browse::featured_products))
        .route("/categories", get(browse::categories))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{product}",
            patch(cart::update).delete(cart::remove),
        )
}

/// Create the vehicle fitment routes router.
pub fn vehicle_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(vehicle::show).put(vehicle::save).delete(vehicle::clear),
        )
        .route("/catalog", get(vehicle::catalog))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/signout", post(auth::sign_out))
        .merge(limited)
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).patch(account::update_profile),
        )
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            delete(account::delete_address).put(account::update_address),
        )
}

/// Create the service-key admin routes router.
pub fn admin_routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/roles", post(admin::assign_role))
        .layer(admin_rate_limiter())
        .layer(admin::cors_layer(config.allowed_origin.as_deref()))
}

/// Create all API routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .nest("/api", browse_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/vehicle", vehicle_routes())
        .nest("/api/auth", auth_routes())
        .nest("/api/account", account_routes())
        .nest("/api/admin", admin_routes(config))
}
