//! Simulation parts: vector shapes with thermal, optical, and mechanical
//! properties.
//!
//! Parts are created and edited by the external geometry/UI layer; the engine
//! rasterizes them into the grid whenever geometry or properties change. A
//! part can act as a heat source (fixed power density or thermostat
//! controlled), hold a constant temperature, or drive airflow as a fan.

use crate::core_types::error::ValidationError;
use crate::core_types::material::Material;
use crate::core_types::optics::OpticalProps;
use crate::core_types::shape::Shape;
use crate::core_types::vec2::Vec2;
use serde::{Deserialize, Serialize};

/// Index of a part within the simulation's part list.
pub type PartId = usize;

/// Fan behavior attached to a part: the rasterized cells of the part impose
/// this velocity on the fluid field each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FanSpec {
    /// Imposed air speed (m/s).
    pub speed: f32,
    /// Flow direction, radians from +x (y down).
    pub angle: f32,
}

impl FanSpec {
    /// Imposed velocity vector.
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.speed * self.angle.cos(), self.speed * self.angle.sin())
    }
}

/// A rigid vector shape with material, optical, and mechanical properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    shape: Shape,
    material: Material,
    optics: OpticalProps,
    /// Volumetric power density when the source is on (W/m³).
    power: f32,
    /// Whether the power source is currently on. Toggled by thermostats.
    power_on: bool,
    /// Fixed temperature (°C): rasterized cells become interior Dirichlet
    /// cells pinned to this value.
    constant_temperature: Option<f32>,
    /// Restitution for particle collisions, in [0, 1].
    elasticity: f32,
    /// Whether reflected photons scatter into a random hemisphere direction
    /// instead of mirror-reflecting.
    scattering: bool,
    /// Optional fan behavior.
    fan: Option<FanSpec>,
}

impl Part {
    /// Create a part from a shape, material, and optical properties.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DegenerateShape`] if the shape encloses no
    /// area; geometry is expected to be validated upstream, but rasterization
    /// must be guarded against zero-area parts regardless.
    pub fn new(shape: Shape, material: Material, optics: OpticalProps) -> Result<Self, ValidationError> {
        let area = shape.area();
        if !area.is_finite() || area <= 0.0 {
            return Err(ValidationError::DegenerateShape);
        }
        Ok(Part {
            shape,
            material,
            optics,
            power: 0.0,
            power_on: true,
            constant_temperature: None,
            elasticity: 1.0,
            scattering: false,
            fan: None,
        })
    }

    /// The part's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Replace the shape. The caller must mark simulation geometry dirty.
    ///
    /// # Errors
    ///
    /// Rejects zero-area shapes.
    pub fn set_shape(&mut self, shape: Shape) -> Result<(), ValidationError> {
        let area = shape.area();
        if !area.is_finite() || area <= 0.0 {
            return Err(ValidationError::DegenerateShape);
        }
        self.shape = shape;
        Ok(())
    }

    /// Thermal material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Replace the material.
    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    /// Optical properties.
    pub fn optics(&self) -> &OpticalProps {
        &self.optics
    }

    /// Replace the optical properties.
    pub fn set_optics(&mut self, optics: OpticalProps) {
        self.optics = optics;
    }

    /// Volumetric power density when on (W/m³).
    pub fn power(&self) -> f32 {
        self.power
    }

    /// Set the volumetric power density (W/m³).
    pub fn set_power(&mut self, power: f32) {
        self.power = power;
    }

    /// Whether the power source is currently on.
    pub fn power_on(&self) -> bool {
        self.power_on
    }

    /// Toggle the power source. Called by thermostats and the UI layer.
    pub fn set_power_on(&mut self, on: bool) {
        self.power_on = on;
    }

    /// Effective volumetric power density this tick (W/m³).
    pub fn effective_power(&self) -> f32 {
        if self.power_on {
            self.power
        } else {
            0.0
        }
    }

    /// Fixed temperature, if this part holds one (°C).
    pub fn constant_temperature(&self) -> Option<f32> {
        self.constant_temperature
    }

    /// Pin (or unpin) the part to a fixed temperature (°C).
    pub fn set_constant_temperature(&mut self, t: Option<f32>) {
        self.constant_temperature = t;
    }

    /// Restitution for particle collisions, in [0, 1].
    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }

    /// Set collision elasticity.
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

    /// Whether reflected photons scatter.
    pub fn scattering(&self) -> bool {
        self.scattering
    }

    /// Enable or disable photon scattering on reflection.
    pub fn set_scattering(&mut self, scattering: bool) {
        self.scattering = scattering;
    }

    /// Fan behavior, if any.
    pub fn fan(&self) -> Option<FanSpec> {
        self.fan
    }

    /// Attach or remove a fan.
    pub fn set_fan(&mut self, fan: Option<FanSpec>) {
        self.fan = fan;
    }

    /// Containment test in world coordinates.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.shape.contains(x, y)
    }
}
