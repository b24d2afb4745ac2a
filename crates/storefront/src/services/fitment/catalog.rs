//! Static make/model/engine reference data.

use chrono::Datelike;

use fitment_forge_core::Vehicle;

use super::FitmentError;

/// Oldest model year offered.
pub const EARLIEST_YEAR: u16 = 1990;

const MAKES: &[(&str, &[&str])] = &[
    ("Toyota", &["Camry", "Corolla", "RAV4", "Highlander", "Prius"]),
    ("Honda", &["Civic", "Accord", "CR-V", "Pilot", "Fit"]),
    ("Ford", &["F-150", "Mustang", "Explorer", "Escape", "Focus"]),
    ("Chevrolet", &["Silverado", "Malibu", "Equinox", "Tahoe", "Camaro"]),
    ("Nissan", &["Altima", "Sentra", "Rogue", "Pathfinder", "Maxima"]),
    ("BMW", &["3 Series", "5 Series", "X3", "X5", "i3"]),
    ("Mercedes-Benz", &["C-Class", "E-Class", "GLC", "GLE", "A-Class"]),
    ("Audi", &["A4", "A6", "Q5", "Q7", "A3"]),
];

const ENGINES: &[&str] = &[
    "2.0L 4-Cylinder",
    "2.5L 4-Cylinder",
    "3.0L V6",
    "3.5L V6",
    "5.0L V8",
];

/// The fitment reference dataset.
///
/// Makes and engines are fixed; only the newest year moves with the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitmentCatalog {
    current_year: u16,
}

impl FitmentCatalog {
    /// Catalog whose newest year is this calendar year.
    #[must_use]
    pub fn standard() -> Self {
        let year = u16::try_from(chrono::Utc::now().year()).unwrap_or(EARLIEST_YEAR);
        Self::with_current_year(year)
    }

    /// Catalog with a fixed newest year.
    #[must_use]
    pub const fn with_current_year(current_year: u16) -> Self {
        let current_year = if current_year < EARLIEST_YEAR {
            EARLIEST_YEAR
        } else {
            current_year
        };
        Self { current_year }
    }

    #[must_use]
    pub const fn current_year(&self) -> u16 {
        self.current_year
    }

    /// Years newest first.
    pub fn years(&self) -> impl Iterator<Item = u16> {
        (EARLIEST_YEAR..=self.current_year).rev()
    }

    pub fn makes(&self) -> impl Iterator<Item = &'static str> {
        MAKES.iter().map(|(make, _)| *make)
    }

    /// Models for a make, or `None` for an unknown make.
    #[must_use]
    pub fn models(&self, make: &str) -> Option<&'static [&'static str]> {
        MAKES
            .iter()
            .find(|(name, _)| *name == make)
            .map(|(_, models)| *models)
    }

    #[must_use]
    pub const fn engines(&self) -> &'static [&'static str] {
        ENGINES
    }

    /// # Errors
    ///
    /// Returns [`FitmentError::YearOutOfRange`] outside `1990..=current`.
    pub const fn check_year(&self, year: u16) -> Result<(), FitmentError> {
        if year < EARLIEST_YEAR || year > self.current_year {
            return Err(FitmentError::YearOutOfRange(year));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`FitmentError::UnknownMake`] if the make is not listed.
    pub fn check_make(&self, make: &str) -> Result<(), FitmentError> {
        self.models(make)
            .map(|_| ())
            .ok_or_else(|| FitmentError::UnknownMake(make.to_owned()))
    }

    /// # Errors
    ///
    /// Returns an error if the make is unknown or does not build the model.
    pub fn check_model(&self, make: &str, model: &str) -> Result<(), FitmentError> {
        let models = self
            .models(make)
            .ok_or_else(|| FitmentError::UnknownMake(make.to_owned()))?;
        if !models.contains(&model) {
            return Err(FitmentError::UnknownModel {
                make: make.to_owned(),
                model: model.to_owned(),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`FitmentError::UnknownEngine`] if the engine is not listed.
    pub fn check_engine(&self, engine: &str) -> Result<(), FitmentError> {
        if !ENGINES.contains(&engine) {
            return Err(FitmentError::UnknownEngine(engine.to_owned()));
        }
        Ok(())
    }

    /// Check every field of a completed selection.
    ///
    /// # Errors
    ///
    /// Returns the first field that is not in the catalog.
    pub fn validate(&self, vehicle: &Vehicle) -> Result<(), FitmentError> {
        self.check_year(vehicle.year)?;
        self.check_model(&vehicle.make, &vehicle.model)?;
        if let Some(engine) = &vehicle.engine {
            self.check_engine(engine)?;
        }
        Ok(())
    }
}

impl Default for FitmentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_years_descend_to_1990() {
        let catalog = FitmentCatalog::with_current_year(2025);
        let years: Vec<u16> = catalog.years().collect();
        assert_eq!(years.first(), Some(&2025));
        assert_eq!(years.last(), Some(&1990));
        assert_eq!(years.len(), 36);
    }

    #[test]
    fn test_makes_in_order() {
        let catalog = FitmentCatalog::with_current_year(2025);
        let makes: Vec<&str> = catalog.makes().collect();
        assert_eq!(makes.len(), 8);
        assert_eq!(makes.first(), Some(&"Toyota"));
        assert_eq!(makes.last(), Some(&"Audi"));
        for make in makes {
            assert_eq!(catalog.models(make).unwrap().len(), 5);
        }
    }

    #[test]
    fn test_validate() {
        let catalog = FitmentCatalog::with_current_year(2025);
        assert!(
            catalog
                .validate(&Vehicle::new(2020, "Toyota", "Camry", Some("3.5L V6".into())))
                .is_ok()
        );
        assert_eq!(
            catalog.validate(&Vehicle::new(1989, "Toyota", "Camry", None)),
            Err(FitmentError::YearOutOfRange(1989))
        );
        assert_eq!(
            catalog.validate(&Vehicle::new(2020, "Toyota", "Civic", None)),
            Err(FitmentError::UnknownModel {
                make: "Toyota".into(),
                model: "Civic".into()
            })
        );
        assert_eq!(
            catalog.validate(&Vehicle::new(2020, "Tesla", "Model 3", None)),
            Err(FitmentError::UnknownMake("Tesla".into()))
        );
        assert_eq!(
            catalog.validate(&Vehicle::new(2020, "Audi", "A4", Some("Electric".into()))),
            Err(FitmentError::UnknownEngine("Electric".into()))
        );
    }

    #[test]
    fn test_future_year_rejected() {
        let catalog = FitmentCatalog::with_current_year(2025);
        assert_eq!(catalog.check_year(2026), Err(FitmentError::YearOutOfRange(2026)));
    }
}
