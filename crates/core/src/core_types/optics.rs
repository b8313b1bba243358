//! Optical interaction properties for photon transport and radiation.

use crate::core_types::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Allowed deviation of absorptivity + reflectivity + transmissivity from 1.
pub const OPTICAL_SUM_TOLERANCE: f32 = 0.01;

/// Surface optical properties of a part.
///
/// The interaction triple (a, r, t) is a probability distribution over what
/// happens to a photon crossing the part boundary; it must sum to 1 within
/// [`OPTICAL_SUM_TOLERANCE`]. Emissivity drives the view-factor radiative
/// exchange and is independent of the triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalProps {
    absorptivity: f32,
    reflectivity: f32,
    transmissivity: f32,
    emissivity: f32,
}

impl OpticalProps {
    /// Create optical properties, validating the interaction triple and
    /// emissivity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OpticalSumOutOfRange`] if
    /// |a + r + t − 1| > 0.01, or [`ValidationError::EmissivityOutOfRange`]
    /// if emissivity is outside [0, 1].
    pub fn new(
        absorptivity: f32,
        reflectivity: f32,
        transmissivity: f32,
        emissivity: f32,
    ) -> Result<Self, ValidationError> {
        let sum = absorptivity + reflectivity + transmissivity;
        if !sum.is_finite()
            || (sum - 1.0).abs() > OPTICAL_SUM_TOLERANCE
            || absorptivity < 0.0
            || reflectivity < 0.0
            || transmissivity < 0.0
        {
            return Err(ValidationError::OpticalSumOutOfRange(sum));
        }
        if !(0.0..=1.0).contains(&emissivity) {
            return Err(ValidationError::EmissivityOutOfRange(emissivity));
        }
        Ok(OpticalProps {
            absorptivity,
            reflectivity,
            transmissivity,
            emissivity,
        })
    }

    /// Fully absorbing, non-emitting surface (the default for solid parts).
    pub fn opaque() -> Self {
        OpticalProps {
            absorptivity: 1.0,
            reflectivity: 0.0,
            transmissivity: 0.0,
            emissivity: 0.0,
        }
    }

    /// Fraction of incident photons absorbed.
    pub fn absorptivity(&self) -> f32 {
        self.absorptivity
    }

    /// Fraction of incident photons reflected.
    pub fn reflectivity(&self) -> f32 {
        self.reflectivity
    }

    /// Fraction of incident photons transmitted.
    pub fn transmissivity(&self) -> f32 {
        self.transmissivity
    }

    /// Thermal emissivity in [0, 1].
    pub fn emissivity(&self) -> f32 {
        self.emissivity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_triple() {
        let o = OpticalProps::new(0.5, 0.3, 0.2, 0.9).unwrap();
        assert_eq!(o.absorptivity(), 0.5);
        assert_eq!(o.emissivity(), 0.9);
    }

    #[test]
    fn test_sum_tolerance() {
        // Within the ±0.01 band
        assert!(OpticalProps::new(0.5, 0.3, 0.205, 0.0).is_ok());
        // Outside
        assert!(matches!(
            OpticalProps::new(0.5, 0.3, 0.3, 0.0),
            Err(ValidationError::OpticalSumOutOfRange(_))
        ));
    }

    #[test]
    fn test_rejects_negative_component() {
        assert!(OpticalProps::new(1.2, -0.1, -0.1, 0.0).is_err());
    }

    #[test]
    fn test_rejects_bad_emissivity() {
        assert!(matches!(
            OpticalProps::new(1.0, 0.0, 0.0, 1.5),
            Err(ValidationError::EmissivityOutOfRange(_))
        ));
    }
}
