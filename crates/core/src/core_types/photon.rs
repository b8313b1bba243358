//! Photon records for the solar transport model.

use crate::core_types::vec2::Vec2;
use serde::{Deserialize, Serialize};

/// A single solar photon: a ray sample carrying a fixed quantum of energy.
///
/// Photons travel at constant speed; they are created by periodic solar
/// emission and destroyed on absorption or when they leave the domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Photon {
    /// Position (m).
    pub position: Vec2,
    /// Velocity (m/s); magnitude is the configured ray speed.
    pub velocity: Vec2,
    /// Energy carried by this photon (J). Deposited into the grid cell at
    /// the absorption point.
    pub energy: f32,
}

impl Photon {
    /// Create a photon.
    pub fn new(position: Vec2, velocity: Vec2, energy: f32) -> Self {
        Photon {
            position,
            velocity,
            energy,
        }
    }

    /// Advance the photon by one time step.
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}
