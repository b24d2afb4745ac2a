//! Cart route handlers.
//!
//! Every request builds its own [`CartManager`] over the shared cart store.
//! The session is the local cache (guest token) and the session's user is
//! the identity, so a sign-in between two requests switches the cart the
//! next request loads.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use fitment_forge_core::ProductId;

use crate::error::Result;
use crate::identity::IdentitySignal;
use crate::local_cache::SessionCache;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::notice::{NoticeBuffer, Notifier};
use crate::routes::WithNotices;
use crate::services::cart::{CartManager, CartSnapshot};
use crate::state::AppState;

/// Cart response body.
#[derive(Debug, Serialize)]
pub struct CartBody {
    pub cart: CartSnapshot,
}

/// Add-to-cart request.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub price: Decimal,
}

const fn default_quantity() -> u32 {
    1
}

/// Quantity update request. Zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

struct OpenCart {
    manager: CartManager,
    notices: Arc<NoticeBuffer>,
}

impl OpenCart {
    fn respond(self) -> WithNotices<CartBody> {
        WithNotices::new(
            CartBody {
                cart: self.manager.snapshot(),
            },
            self.notices.drain(),
        )
    }
}

/// Build a manager for this visitor and load their cart.
async fn open_cart(state: &AppState, session: Session, user: Option<&CurrentUser>) -> OpenCart {
    let notices = Arc::new(NoticeBuffer::new());
    let notifier: Arc<dyn Notifier> = notices.clone();
    let identity = IdentitySignal::new(user.map(|u| u.id));
    let mut manager = CartManager::new(
        Arc::clone(&state.stores().carts),
        Arc::new(SessionCache::new(session)),
        identity.subscribe(),
        notifier,
    );
    manager.load().await;
    OpenCart { manager, notices }
}

/// Load the visitor's cart.
///
/// GET /api/cart
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> WithNotices<CartBody> {
    open_cart(&state, session, user.as_ref()).await.respond()
}

/// Add a line, merging with an existing line for the same product.
///
/// POST /api/cart/items
///
/// # Errors
///
/// Returns 400 if the line is invalid.
#[instrument(skip(state, session, user, body), fields(product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<WithNotices<CartBody>> {
    let mut cart = open_cart(&state, session, user.as_ref()).await;
    cart.manager
        .add_line(body.product_id, body.quantity, body.price)
        .await?;
    Ok(cart.respond())
}

/// Set a line's quantity.
///
/// PATCH /api/cart/items/{product}
///
/// # Errors
///
/// Returns 400 if the quantity does not fit a cart line.
#[instrument(skip(state, session, user, body), fields(product_id = %product))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<WithNotices<CartBody>> {
    let mut cart = open_cart(&state, session, user.as_ref()).await;
    cart.manager
        .update_quantity(&ProductId::new(product), body.quantity)
        .await?;
    Ok(cart.respond())
}

/// Remove a line.
///
/// DELETE /api/cart/items/{product}
#[instrument(skip(state, session, user), fields(product_id = %product))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product): Path<String>,
) -> WithNotices<CartBody> {
    let mut cart = open_cart(&state, session, user.as_ref()).await;
    cart.manager.remove_line(&ProductId::new(product)).await;
    cart.respond()
}

/// Empty the cart.
///
/// DELETE /api/cart
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> WithNotices<CartBody> {
    let mut cart = open_cart(&state, session, user.as_ref()).await;
    cart.manager.clear().await;
    cart.respond()
}
