//! Vector type alias for 2D positions and directions.

use nalgebra::Vector2;

/// 2D vector type for positions, velocities, and directions.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`, used throughout
/// the simulation for cell-space positions, fluid velocities, photon rays,
/// and particle trajectories.
pub type Vec2 = Vector2<f32>;
