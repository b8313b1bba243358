//! Discrete physics on top of the grid: photons, particles, and radiative
//! exchange.

pub mod particles;
pub mod photons;
pub mod radiation;

pub use particles::{ParticleFeeder, ParticleParams, ParticleSystem};
pub use photons::{PhotonStats, PhotonTransport, SolarConfig};
pub use radiation::{
    estimated_segment_count, Segment, ViewFactorNetwork, SEGMENT_WARN_THRESHOLD, STEFAN_BOLTZMANN,
};
