//! Thermal material properties.

use crate::core_types::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Smallest admissible thermal conductivity (W/(m·K)).
///
/// Conductivity is the one material property that is floored instead of
/// rejected: a zero conductivity row makes the implicit diffusion system
/// singular, so the grid must never carry one.
pub const MIN_CONDUCTIVITY: f32 = 1e-9;

/// Bulk thermal properties of a material.
///
/// Density and specific heat are validated at construction and never
/// clamped afterwards; conductivity is floored to [`MIN_CONDUCTIVITY`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Thermal conductivity k (W/(m·K)), always >= [`MIN_CONDUCTIVITY`].
    conductivity: f32,
    /// Density ρ (kg/m³), always > 0.
    density: f32,
    /// Specific heat c (J/(kg·K)), always > 0.
    specific_heat: f32,
}

impl Material {
    /// Create a material, validating density and specific heat and flooring
    /// conductivity to [`MIN_CONDUCTIVITY`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if density or specific heat is not
    /// strictly positive.
    pub fn new(conductivity: f32, density: f32, specific_heat: f32) -> Result<Self, ValidationError> {
        if !density.is_finite() || density <= 0.0 {
            return Err(ValidationError::NonPositiveDensity(density));
        }
        if !specific_heat.is_finite() || specific_heat <= 0.0 {
            return Err(ValidationError::NonPositiveSpecificHeat(specific_heat));
        }
        let floored = conductivity.max(MIN_CONDUCTIVITY);
        if floored != conductivity {
            warn!(
                "conductivity {conductivity} floored to {MIN_CONDUCTIVITY} to keep the diffusion solve well-posed"
            );
        }
        Ok(Material {
            conductivity: floored,
            density,
            specific_heat,
        })
    }

    /// Air at room temperature.
    pub fn air() -> Self {
        Material {
            conductivity: 0.026,
            density: 1.204,
            specific_heat: 1012.0,
        }
    }

    /// Thermal conductivity (W/(m·K)).
    pub fn conductivity(&self) -> f32 {
        self.conductivity
    }

    /// Density (kg/m³).
    pub fn density(&self) -> f32 {
        self.density
    }

    /// Specific heat (J/(kg·K)).
    pub fn specific_heat(&self) -> f32 {
        self.specific_heat
    }

    /// Volumetric heat capacity ρ·c (J/(m³·K)).
    pub fn volumetric_heat_capacity(&self) -> f32 {
        self.density * self.specific_heat
    }
}
