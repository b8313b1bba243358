//! Heatlab Core Library
//!
//! A coupled 2D heat-transfer simulation engine for interactive "what-if"
//! physics exploration: how insulation, fans, or sunlight change a room's
//! temperature field over time.
//!
//! ## Engine Pipeline
//!
//! Each tick couples four models over one rectangular grid:
//! - Implicit heat conduction (tridiagonal sweeps per row and column)
//! - Buoyant convection with upwind transport and Boussinesq forcing
//! - Photon-based solar transport with stochastic part interaction
//! - Lagrangian rigid-particle dynamics with drag and thermophoresis
//!
//! plus a segment-to-segment radiative view-factor network (opt-in, O(n²))
//! and a sensor/thermostat control loop that feeds back into part power.
//!
//! The rendering/UI layer is an external collaborator: it edits parts,
//! boundary conditions, and configuration, and reads the grid fields,
//! photon/particle populations, and sensor series exposed by
//! [`Simulation`].

// Core types and utilities
pub mod core_types;

// Grid state and rasterization
pub mod grid;

// Field solvers
pub mod solver;

// Discrete physics (photons, particles, radiation)
pub mod physics;

// Orchestration and control
pub mod simulation;

// Re-export core types
pub use core_types::{
    Bounds, FanSpec, Material, OpticalProps, Part, PartId, Particle, Photon, Shape,
    ValidationError, Vec2,
};

// Re-export grid types
pub use grid::{BoundaryConditions, Edge, EdgeCondition, Field, MassBoundary, SimulationGrid,
    ThermalBoundary};

// Re-export solver types
pub use solver::{BuoyancyApproximation, ConvectionParams, GravityType, SolverError};

// Re-export physics types
pub use physics::{
    ParticleFeeder, ParticleParams, ParticleSystem, PhotonStats, PhotonTransport, SolarConfig,
    ViewFactorNetwork,
};

// Re-export orchestration types
pub use simulation::{
    HeatPulse, HeatQueue, Sensor, SensorKind, SensorRecord, Simulation, SimulationConfig, Stencil,
    Thermostat,
};
