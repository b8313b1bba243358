//! Core types and utilities

pub mod error;
pub mod material;
pub mod optics;
pub mod part;
pub mod particle;
pub mod photon;
pub mod shape;
pub mod vec2;

pub use error::ValidationError;
pub use material::{Material, MIN_CONDUCTIVITY};
pub use optics::{OpticalProps, OPTICAL_SUM_TOLERANCE};
pub use part::{FanSpec, Part, PartId};
pub use particle::Particle;
pub use photon::Photon;
pub use shape::{Bounds, Shape};
pub use vec2::Vec2;
