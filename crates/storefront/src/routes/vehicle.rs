//! Vehicle fitment route handlers.
//!
//! The selection lives in the session under `selected_vehicle`. For a
//! signed-in user it is also mirrored into the profile's saved vehicle,
//! which then seeds the selector on later visits.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use fitment_forge_core::Vehicle;

use crate::error::Result;
use crate::local_cache::SessionCache;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::notice::Notice;
use crate::routes::WithNotices;
use crate::services::account::AccountService;
use crate::services::fitment::{FitmentCatalog, VehicleSelector};
use crate::state::AppState;

/// Selection response body.
#[derive(Debug, Serialize)]
pub struct VehicleBody {
    pub vehicle: Option<Vehicle>,
    /// Badge text, e.g. `2020 Toyota Camry (3.5L V6)`.
    pub summary: Option<String>,
    pub choices: Choices,
}

/// Dropdown options for the current selection. A level that is not
/// offered yet is empty.
#[derive(Debug, Serialize)]
pub struct Choices {
    pub years: Vec<u16>,
    pub makes: Vec<&'static str>,
    pub models: &'static [&'static str],
    pub engines: &'static [&'static str],
}

impl Choices {
    fn for_selector(selector: &VehicleSelector) -> Self {
        let catalog = selector.catalog();
        Self {
            years: catalog.years().collect(),
            makes: if selector.offers_make() {
                catalog.makes().collect()
            } else {
                Vec::new()
            },
            models: selector.model_choices(),
            engines: if selector.offers_engine() {
                catalog.engines()
            } else {
                &[]
            },
        }
    }
}

fn body(selector: &VehicleSelector) -> VehicleBody {
    VehicleBody {
        vehicle: selector.selection(),
        summary: selector.summary(),
        choices: Choices::for_selector(selector),
    }
}

/// Full catalog response body.
#[derive(Debug, Serialize)]
pub struct CatalogBody {
    pub years: Vec<u16>,
    pub makes: Vec<&'static str>,
    pub models: BTreeMap<&'static str, &'static [&'static str]>,
    pub engines: &'static [&'static str],
}

impl From<FitmentCatalog> for CatalogBody {
    fn from(catalog: FitmentCatalog) -> Self {
        let makes: Vec<&'static str> = catalog.makes().collect();
        let models = makes
            .iter()
            .filter_map(|make| catalog.models(make).map(|models| (*make, models)))
            .collect();
        Self {
            years: catalog.years().collect(),
            makes,
            models,
            engines: catalog.engines(),
        }
    }
}

/// Save request. Engine is optional.
#[derive(Debug, Deserialize)]
pub struct SaveVehicleRequest {
    pub year: u16,
    pub make: String,
    pub model: String,
    pub engine: Option<String>,
}

async fn saved_vehicle(state: &AppState, user: &CurrentUser) -> Option<Vehicle> {
    let account = AccountService::new(
        state.stores().profiles.as_ref(),
        state.stores().addresses.as_ref(),
    );
    match account.profile(user.id).await {
        Ok(profile) => profile.saved_vehicle,
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to read saved vehicle");
            None
        }
    }
}

/// Write the selection into the profile. Failure becomes a notice; the
/// session copy is already saved.
async fn mirror_to_profile(
    state: &AppState,
    user: &CurrentUser,
    vehicle: Option<&Vehicle>,
    notices: &mut Vec<Notice>,
) {
    let account = AccountService::new(
        state.stores().profiles.as_ref(),
        state.stores().addresses.as_ref(),
    );
    if let Err(e) = account.set_saved_vehicle(user.id, vehicle).await {
        tracing::error!(user_id = %user.id, error = %e, "Failed to save vehicle to profile");
        notices.push(Notice::destructive(
            "Error",
            "Failed to save vehicle to your profile.",
        ));
    }
}

/// Current selection and the choices it unlocks.
///
/// GET /api/vehicle
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Json<VehicleBody> {
    let seeded = match &user {
        Some(user) => saved_vehicle(&state, user).await,
        None => None,
    };
    let mut selector = VehicleSelector::new(
        state.catalog(),
        Arc::new(SessionCache::new(session)),
        seeded,
        false,
    );
    selector.load_cached().await;
    Json(body(&selector))
}

/// Save a complete selection.
///
/// PUT /api/vehicle
///
/// # Errors
///
/// Returns 400 if any field is outside the catalog.
#[instrument(skip(state, session, user, request), fields(year = request.year, make = %request.make))]
pub async fn save(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<SaveVehicleRequest>,
) -> Result<WithNotices<VehicleBody>> {
    let mut selector = VehicleSelector::new(
        state.catalog(),
        Arc::new(SessionCache::new(session)),
        None,
        false,
    );
    selector.set_year(Some(request.year))?;
    selector.set_make(Some(request.make))?;
    selector.set_model(Some(request.model))?;
    selector.set_engine(request.engine)?;

    let vehicle = selector.save().await;
    let mut notices = Vec::new();
    if let Some(user) = &user {
        mirror_to_profile(&state, user, vehicle.as_ref(), &mut notices).await;
    }

    Ok(WithNotices::new(body(&selector), notices))
}

/// Forget the selection.
///
/// DELETE /api/vehicle
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> WithNotices<VehicleBody> {
    let mut selector = VehicleSelector::new(
        state.catalog(),
        Arc::new(SessionCache::new(session)),
        None,
        false,
    );
    selector.clear().await;

    let mut notices = Vec::new();
    if let Some(user) = &user {
        mirror_to_profile(&state, user, None, &mut notices).await;
    }

    WithNotices::new(body(&selector), notices)
}

/// The whole reference catalog.
///
/// GET /api/vehicle/catalog
pub async fn catalog(State(state): State<AppState>) -> Json<CatalogBody> {
    Json(CatalogBody::from(state.catalog()))
}
