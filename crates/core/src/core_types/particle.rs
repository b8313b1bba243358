//! Rigid particle records for Lagrangian dynamics.

use crate::core_types::error::ValidationError;
use crate::core_types::vec2::Vec2;
use serde::{Deserialize, Serialize};

/// A rigid circular particle advected through the fluid field.
///
/// Particles are created by explicit insertion or by a feeder, and destroyed
/// when removed or when they cross a "through" boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Position (m).
    pub position: Vec2,
    /// Velocity (m/s).
    pub velocity: Vec2,
    /// Mass (kg), > 0.
    pub mass: f32,
    /// Radius (m), > 0.
    pub radius: f32,
    /// Orientation (rad).
    pub theta: f32,
    /// Angular velocity (rad/s).
    pub omega: f32,
    /// Particle temperature (°C), relaxed toward the local fluid temperature.
    pub temperature: f32,
    /// Restitution in [0, 1] for boundary and particle collisions.
    pub elasticity: f32,
    /// Whether the integrator moves this particle. Pinned obstacles are
    /// immovable but still collide.
    pub movable: bool,
    /// Whether the UI layer may drag this particle.
    pub draggable: bool,
}

impl Particle {
    /// Create a particle at rest.
    ///
    /// # Errors
    ///
    /// Rejects non-positive mass or radius and elasticity outside [0, 1].
    pub fn new(position: Vec2, mass: f32, radius: f32) -> Result<Self, ValidationError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(ValidationError::NonPositiveMass(mass));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ValidationError::NonPositiveRadius(radius));
        }
        Ok(Particle {
            position,
            velocity: Vec2::zeros(),
            mass,
            radius,
            theta: 0.0,
            omega: 0.0,
            temperature: 0.0,
            elasticity: 1.0,
            movable: true,
            draggable: true,
        })
    }

    /// Set the restitution coefficient.
    ///
    /// # Errors
    ///
    /// Rejects values outside [0, 1].
    pub fn set_elasticity(&mut self, elasticity: f32) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&elasticity) {
            return Err(ValidationError::ElasticityOutOfRange(elasticity));
        }
        self.elasticity = elasticity;
        Ok(())
    }

    /// Kinetic energy (J).
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.norm_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_particles() {
        assert!(matches!(
            Particle::new(Vec2::zeros(), 0.0, 0.1),
            Err(ValidationError::NonPositiveMass(_))
        ));
        assert!(matches!(
            Particle::new(Vec2::zeros(), 1.0, 0.0),
            Err(ValidationError::NonPositiveRadius(_))
        ));
        assert!(matches!(
            Particle::new(Vec2::zeros(), 1.0, -0.5),
            Err(ValidationError::NonPositiveRadius(_))
        ));
    }

    #[test]
    fn test_elasticity_bounds() {
        let mut p = Particle::new(Vec2::zeros(), 1.0, 0.1).unwrap();
        assert!(p.set_elasticity(0.0).is_ok());
        assert!(p.set_elasticity(1.0).is_ok());
        assert!(p.set_elasticity(-0.1).is_err());
        assert!(p.set_elasticity(1.1).is_err());
    }

    #[test]
    fn test_kinetic_energy() {
        let mut p = Particle::new(Vec2::zeros(), 2.0, 0.1).unwrap();
        p.velocity = Vec2::new(3.0, 4.0);
        assert!((p.kinetic_energy() - 25.0).abs() < 1e-5);
    }
}
