//! Session-related types.
//!
//! The visitor's session doubles as the per-visitor local cache, so the
//! keys used by the cart and the fitment selector are listed here too.

use serde::{Deserialize, Serialize};

use fitment_forge_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Whether this session was opened through the admin sign-in.
    #[serde(default)]
    pub is_admin: bool,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the guest cart token.
    pub const CART_SESSION_ID: &str = "cart_session_id";

    /// Key for the serialized vehicle selection.
    pub const SELECTED_VEHICLE: &str = "selected_vehicle";
}
