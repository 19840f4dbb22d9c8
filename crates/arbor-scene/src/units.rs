//! Model unit systems and their metric scale factors.

use serde::{Deserialize, Serialize};

/// Unit system of the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelUnits {
    Microns,
    #[default]
    Millimeters,
    Centimeters,
    Meters,
    Kilometers,
    Inches,
    Feet,
}

impl ModelUnits {
    /// Meters per one model unit.
    pub fn meters_per_unit(self) -> f64 {
        match self {
            ModelUnits::Microns => 1.0e-6,
            ModelUnits::Millimeters => 1.0e-3,
            ModelUnits::Centimeters => 1.0e-2,
            ModelUnits::Meters => 1.0,
            ModelUnits::Kilometers => 1.0e3,
            ModelUnits::Inches => 0.0254,
            ModelUnits::Feet => 0.3048,
        }
    }
}
