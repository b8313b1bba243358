//! Grid state: field arrays, boundary conditions, and rasterization

pub mod boundary;
pub mod field;
pub mod rasterize;
pub mod simulation_grid;

pub use boundary::{BoundaryConditions, Edge, EdgeCondition, MassBoundary, ThermalBoundary};
pub use field::Field;
pub use rasterize::rasterize;
pub use simulation_grid::{SimulationGrid, NO_PART};
