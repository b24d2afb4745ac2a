//! Vehicle fitment selection.
//!
//! [`VehicleSelector`] drives the year → make → model → engine dropdowns.
//! Each level is only offered once the level before it is set, and changing
//! a parent clears its dependants:
//!
//! - a different make clears model and engine
//! - a different model clears engine
//! - year never clears anything
//!
//! A saved selection is written to the visitor's local cache under
//! `selected_vehicle` and handed to the `on_change` callback.

pub mod catalog;

use std::sync::Arc;

use thiserror::Error;

use fitment_forge_core::Vehicle;

pub use catalog::{EARLIEST_YEAR, FitmentCatalog};

use crate::local_cache::LocalCache;
use crate::models::session_keys;

/// A selector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitmentField {
    Year,
    Make,
    Model,
    Engine,
}

impl std::fmt::Display for FitmentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Year => "year",
            Self::Make => "make",
            Self::Model => "model",
            Self::Engine => "engine",
        })
    }
}

/// Rejected selector input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitmentError {
    #[error("{0} cannot be chosen yet")]
    NotOffered(FitmentField),

    #[error("unknown make: {0}")]
    UnknownMake(String),

    #[error("{make} does not offer model {model}")]
    UnknownModel { make: String, model: String },

    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    #[error("year {0} is out of range")]
    YearOutOfRange(u16),
}

/// Receives the new selection after save, clear, or a cached load.
pub type VehicleCallback = Box<dyn Fn(Option<&Vehicle>) + Send + Sync>;

/// Four-level dependent vehicle selector.
pub struct VehicleSelector {
    catalog: FitmentCatalog,
    cache: Arc<dyn LocalCache>,
    year: Option<u16>,
    make: Option<String>,
    model: Option<String>,
    engine: Option<String>,
    externally_selected: bool,
    compact: bool,
    expanded: bool,
    on_change: Option<VehicleCallback>,
}

impl VehicleSelector {
    /// Create a selector, optionally seeded with a selection supplied by the
    /// caller (e.g. a signed-in user's saved vehicle).
    #[must_use]
    pub fn new(
        catalog: FitmentCatalog,
        cache: Arc<dyn LocalCache>,
        selected: Option<Vehicle>,
        compact: bool,
    ) -> Self {
        let externally_selected = selected.is_some();
        let (year, make, model, engine) = match selected {
            Some(v) => (Some(v.year), Some(v.make), Some(v.model), v.engine),
            None => (None, None, None, None),
        };
        Self {
            catalog,
            cache,
            year,
            make,
            model,
            engine,
            externally_selected,
            compact,
            expanded: !compact,
            on_change: None,
        }
    }

    /// Register the change callback.
    #[must_use]
    pub fn on_change(mut self, callback: VehicleCallback) -> Self {
        self.on_change = Some(callback);
        self
    }

    fn notify(&self, vehicle: Option<&Vehicle>) {
        if let Some(callback) = &self.on_change {
            callback(vehicle);
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &FitmentCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn year(&self) -> Option<u16> {
        self.year
    }

    #[must_use]
    pub fn make(&self) -> Option<&str> {
        self.make.as_deref()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    #[must_use]
    pub fn engine(&self) -> Option<&str> {
        self.engine.as_deref()
    }

    #[must_use]
    pub const fn is_compact(&self) -> bool {
        self.compact
    }

    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether the make dropdown is offered.
    #[must_use]
    pub const fn offers_make(&self) -> bool {
        self.year.is_some()
    }

    /// Whether the model dropdown is offered.
    #[must_use]
    pub const fn offers_model(&self) -> bool {
        self.make.is_some()
    }

    /// Whether the engine dropdown is offered.
    #[must_use]
    pub const fn offers_engine(&self) -> bool {
        self.model.is_some()
    }

    /// Models for the chosen make.
    #[must_use]
    pub fn model_choices(&self) -> &'static [&'static str] {
        self.make
            .as_deref()
            .and_then(|make| self.catalog.models(make))
            .unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns [`FitmentError::YearOutOfRange`] for years outside the catalog.
    pub fn set_year(&mut self, year: Option<u16>) -> Result<(), FitmentError> {
        if let Some(year) = year {
            self.catalog.check_year(year)?;
        }
        self.year = year;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if no year is chosen or the make is unknown.
    pub fn set_make(&mut self, make: Option<String>) -> Result<(), FitmentError> {
        if make == self.make {
            return Ok(());
        }
        if let Some(make) = &make {
            if !self.offers_make() {
                return Err(FitmentError::NotOffered(FitmentField::Make));
            }
            self.catalog.check_make(make)?;
        }
        self.make = make;
        self.model = None;
        self.engine = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if no make is chosen or the make has no such model.
    pub fn set_model(&mut self, model: Option<String>) -> Result<(), FitmentError> {
        if model == self.model {
            return Ok(());
        }
        if let Some(model) = &model {
            let Some(make) = self.make.as_deref() else {
                return Err(FitmentError::NotOffered(FitmentField::Model));
            };
            self.catalog.check_model(make, model)?;
        }
        self.model = model;
        self.engine = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if no model is chosen or the engine is unknown.
    pub fn set_engine(&mut self, engine: Option<String>) -> Result<(), FitmentError> {
        if let Some(engine) = &engine {
            if !self.offers_engine() {
                return Err(FitmentError::NotOffered(FitmentField::Engine));
            }
            self.catalog.check_engine(engine)?;
        }
        self.engine = engine;
        Ok(())
    }

    /// Whether year, make and model are all chosen.
    #[must_use]
    pub const fn can_save(&self) -> bool {
        self.year.is_some() && self.make.is_some() && self.model.is_some()
    }

    /// Whether anything is chosen.
    #[must_use]
    pub const fn can_clear(&self) -> bool {
        self.year.is_some() || self.make.is_some() || self.model.is_some() || self.engine.is_some()
    }

    /// The completed selection, if there is one.
    #[must_use]
    pub fn selection(&self) -> Option<Vehicle> {
        match (self.year, &self.make, &self.model) {
            (Some(year), Some(make), Some(model)) => Some(Vehicle::new(
                year,
                make.clone(),
                model.clone(),
                self.engine.clone(),
            )),
            _ => None,
        }
    }

    /// Save the completed selection.
    ///
    /// Does nothing and returns `None` unless year, make and model are set.
    /// Otherwise the callback fires, the selection is cached, and a compact
    /// selector collapses.
    pub async fn save(&mut self) -> Option<Vehicle> {
        let vehicle = self.selection()?;
        self.notify(Some(&vehicle));

        match serde_json::to_string(&vehicle) {
            Ok(json) => {
                if let Err(e) = self.cache.set(session_keys::SELECTED_VEHICLE, json).await {
                    tracing::warn!(error = %e, "Failed to cache vehicle selection");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize vehicle selection"),
        }

        if self.compact {
            self.expanded = false;
        }
        tracing::debug!(vehicle = %vehicle, "Vehicle saved");
        Some(vehicle)
    }

    /// Reset every field and forget the cached selection.
    pub async fn clear(&mut self) {
        self.year = None;
        self.make = None;
        self.model = None;
        self.engine = None;
        self.notify(None);

        if let Err(e) = self.cache.remove(session_keys::SELECTED_VEHICLE).await {
            tracing::warn!(error = %e, "Failed to remove cached vehicle selection");
        }
    }

    /// Adopt the cached selection when none was supplied to [`new`](Self::new).
    ///
    /// Unparseable or unknown cached data is logged and ignored; the
    /// selector stays empty and the callback does not fire.
    pub async fn load_cached(&mut self) -> Option<Vehicle> {
        if self.externally_selected {
            return None;
        }

        let raw = match self.cache.get(session_keys::SELECTED_VEHICLE).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cached vehicle selection");
                return None;
            }
        };

        let vehicle = match serde_json::from_str::<Vehicle>(&raw) {
            Ok(vehicle) => vehicle,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed cached vehicle selection");
                return None;
            }
        };
        if let Err(e) = self.catalog.validate(&vehicle) {
            tracing::warn!(error = %e, "Ignoring cached vehicle outside the catalog");
            return None;
        }

        self.year = Some(vehicle.year);
        self.make = Some(vehicle.make.clone());
        self.model = Some(vehicle.model.clone());
        self.engine.clone_from(&vehicle.engine);
        self.notify(Some(&vehicle));
        Some(vehicle)
    }

    /// Flip between the compact badge and the full form.
    pub const fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Badge text such as `2020 Toyota Camry (3.5L V6)`.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        self.selection().map(|vehicle| vehicle.to_string())
    }
}
