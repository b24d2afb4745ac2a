//! Completed vehicle fitment selection.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A vehicle chosen in the fitment selector.
///
/// Year, make and model are always present; only the engine is optional.
/// The JSON form omits `engine` when absent so that a cached selection
/// round-trips byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    pub year: u16,
    pub make: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

impl Vehicle {
    /// Create a vehicle selection.
    #[must_use]
    pub fn new(
        year: u16,
        make: impl Into<String>,
        model: impl Into<String>,
        engine: Option<String>,
    ) -> Self {
        Self {
            year,
            make: make.into(),
            model: model.into(),
            engine,
        }
    }
}

impl fmt::Display for Vehicle {
    /// Compact badge text, e.g. `2020 Toyota Camry (3.5L V6)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.make, self.model)?;
        if let Some(engine) = &self.engine {
            write!(f, " ({engine})")?;
        }
        Ok(())
    }
}
