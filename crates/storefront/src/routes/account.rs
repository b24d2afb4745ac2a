//! Account route handlers (profile and address book).
//!
//! All routes require a signed-in user and only touch that user's rows.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use fitment_forge_core::AddressId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Address, AddressInput, Profile, ProfileUpdate};
use crate::notice::Notice;
use crate::routes::WithNotices;
use crate::services::account::AccountService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileBody {
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct AddressesBody {
    pub addresses: Vec<Address>,
}

#[derive(Debug, Serialize)]
pub struct AddressBody {
    pub address: Address,
}

#[derive(Debug, Serialize)]
pub struct DeletedBody {
    pub deleted: AddressId,
}

fn account_service(state: &AppState) -> AccountService<'_> {
    AccountService::new(
        state.stores().profiles.as_ref(),
        state.stores().addresses.as_ref(),
    )
}

/// GET /api/account/profile
///
/// # Errors
///
/// Returns an error if the profile cannot be read or created.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ProfileBody>> {
    let profile = account_service(&state)
        .profile(user.id)
        .await
        .map_err(|e| AppError::account("load profile", e))?;
    Ok(Json(ProfileBody { profile }))
}

/// PATCH /api/account/profile
///
/// Fields left out of the body keep their stored values.
///
/// # Errors
///
/// Returns an error if the profile store fails.
#[instrument(skip(state, user, update), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(update): Json<ProfileUpdate>,
) -> Result<WithNotices<ProfileBody>> {
    let profile = account_service(&state)
        .update_profile(user.id, &update)
        .await
        .map_err(|e| AppError::account("update profile", e))?;

    Ok(WithNotices::new(
        ProfileBody { profile },
        vec![Notice::info(
            "Profile updated!",
            "Your profile information has been saved.",
        )],
    ))
}

/// GET /api/account/addresses
///
/// # Errors
///
/// Returns an error if the address store fails.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<AddressesBody>> {
    let addresses = account_service(&state)
        .addresses(user.id)
        .await
        .map_err(|e| AppError::account("load addresses", e))?;
    Ok(Json(AddressesBody { addresses }))
}

/// POST /api/account/addresses
///
/// # Errors
///
/// Returns 400 if a required field is blank.
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<AddressInput>,
) -> Result<WithNotices<AddressBody>> {
    let address = account_service(&state)
        .add_address(user.id, &input)
        .await
        .map_err(|e| AppError::account("add address", e))?;

    Ok(WithNotices::new(
        AddressBody { address },
        vec![Notice::info("Address added", "Your address has been saved.")],
    ))
}

/// PUT /api/account/addresses/{id}
///
/// # Errors
///
/// Returns 404 if the user has no such address.
#[instrument(skip(state, user, input), fields(user_id = %user.id, address_id = %id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    Json(input): Json<AddressInput>,
) -> Result<WithNotices<AddressBody>> {
    let address = account_service(&state)
        .update_address(user.id, id, &input)
        .await
        .map_err(|e| AppError::account("update address", e))?;

    Ok(WithNotices::new(
        AddressBody { address },
        vec![Notice::info(
            "Address updated",
            "Your address has been updated.",
        )],
    ))
}

/// DELETE /api/account/addresses/{id}
///
/// # Errors
///
/// Returns 404 if the user has no such address.
#[instrument(skip(state, user), fields(user_id = %user.id, address_id = %id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<WithNotices<DeletedBody>> {
    account_service(&state)
        .delete_address(user.id, id)
        .await
        .map_err(|e| AppError::account("delete address", e))?;

    Ok(WithNotices::new(
        DeletedBody { deleted: id },
        vec![Notice::info(
            "Address deleted",
            "Your address has been removed.",
        )],
    ))
}
