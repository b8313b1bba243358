//! Global simulation configuration.

use crate::core_types::error::ValidationError;
use crate::physics::particles::ParticleParams;
use crate::physics::photons::SolarConfig;
use crate::solver::convection::ConvectionParams;
use serde::{Deserialize, Serialize};

/// Everything the orchestrator needs to know that is not geometry.
///
/// The time step is validated at assignment and therefore private; all
/// other knobs are plain data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulation time step Δt (s), always > 0.
    time_step: f32,
    /// Whether the convection step runs at all.
    pub convective: bool,
    /// Buoyancy and gravity settings for the convection step.
    pub convection: ConvectionParams,
    /// Solar photon emission settings.
    pub solar: SolarConfig,
    /// Particle integration settings.
    pub particles: ParticleParams,
    /// Heat-loss rate toward the background through the unmodeled z
    /// direction (1/s); 0 disables the pass.
    pub z_heat_diffusivity: f32,
    /// Restrict z-direction heat loss to fluid cells.
    pub z_heat_fluid_only: bool,
    /// Target boundary-segment length (m) when discretizing parts for the
    /// radiative view-factor network.
    pub radiation_patch_size: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            time_step: 0.1,
            convective: true,
            convection: ConvectionParams::default(),
            solar: SolarConfig::default(),
            particles: ParticleParams::default(),
            z_heat_diffusivity: 0.0,
            z_heat_fluid_only: true,
            radiation_patch_size: 0.5,
        }
    }
}

impl SimulationConfig {
    /// Simulation time step (s).
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Set the time step.
    ///
    /// # Errors
    ///
    /// Rejects non-positive or non-finite values.
    pub fn set_time_step(&mut self, dt: f32) -> Result<(), ValidationError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ValidationError::NonPositiveTimeStep(dt));
        }
        self.time_step = dt;
        Ok(())
    }
}
