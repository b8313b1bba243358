//! Validation errors for material, optical, and configuration input.
//!
//! Invalid physical input is rejected at the point of assignment rather than
//! clamped. The one sanctioned exception is thermal conductivity, which the
//! grid floors to a small positive epsilon so the diffusion solve stays
//! well-posed.

/// Errors raised when a physical property or configuration value is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Density must be strictly positive (kg/m³).
    NonPositiveDensity(f32),
    /// Specific heat must be strictly positive (J/(kg·K)).
    NonPositiveSpecificHeat(f32),
    /// Absorptivity + reflectivity + transmissivity must sum to 1 ± 0.01.
    OpticalSumOutOfRange(f32),
    /// Emissivity must lie in [0, 1].
    EmissivityOutOfRange(f32),
    /// Elasticity must lie in [0, 1].
    ElasticityOutOfRange(f32),
    /// Simulation time step must be strictly positive (s).
    NonPositiveTimeStep(f32),
    /// Particle radius must be strictly positive (m).
    NonPositiveRadius(f32),
    /// Particle mass must be strictly positive (kg).
    NonPositiveMass(f32),
    /// Shape has zero (or negative) enclosed area.
    DegenerateShape,
    /// Thermostat deadband must be non-negative (°C).
    NegativeDeadband(f32),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NonPositiveDensity(v) => {
                write!(f, "density must be > 0 kg/m³, got {v}")
            }
            ValidationError::NonPositiveSpecificHeat(v) => {
                write!(f, "specific heat must be > 0 J/(kg·K), got {v}")
            }
            ValidationError::OpticalSumOutOfRange(sum) => {
                write!(
                    f,
                    "absorptivity + reflectivity + transmissivity must be 1 ± 0.01, got {sum}"
                )
            }
            ValidationError::EmissivityOutOfRange(v) => {
                write!(f, "emissivity must be in [0, 1], got {v}")
            }
            ValidationError::ElasticityOutOfRange(v) => {
                write!(f, "elasticity must be in [0, 1], got {v}")
            }
            ValidationError::NonPositiveTimeStep(v) => {
                write!(f, "time step must be > 0 s, got {v}")
            }
            ValidationError::NonPositiveRadius(v) => {
                write!(f, "particle radius must be > 0 m, got {v}")
            }
            ValidationError::NonPositiveMass(v) => {
                write!(f, "particle mass must be > 0 kg, got {v}")
            }
            ValidationError::DegenerateShape => {
                write!(f, "shape encloses no area")
            }
            ValidationError::NegativeDeadband(v) => {
                write!(f, "thermostat deadband must be >= 0 °C, got {v}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
