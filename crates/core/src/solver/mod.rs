//! Field solvers: the tridiagonal primitive, implicit diffusion, and
//! buoyant convection.

pub mod convection;
pub mod tdma;
pub mod thermal;

pub use convection::{
    enforce_mass_boundaries, step_convection, BuoyancyApproximation, ConvectionParams, GravityType,
};
pub use thermal::{apply_z_heat_loss, assemble_sources, step_diffusion, SolverError};
