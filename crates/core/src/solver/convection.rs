//! Buoyant convection: upwind advection, Boussinesq forcing, and mass
//! boundary enforcement.
//!
//! The velocity field is driven by a single body force,
//!
//! ```text
//! a = g·β·(T − T_ref)
//! ```
//!
//! directed against gravity (Boussinesq approximation). `T_ref` is either
//! the average over all fluid cells or the per-column average, and gravity is
//! either uniform (down) or radially centric. Transport uses first-order
//! upwind differences for both temperature and momentum; a small kinematic
//! viscosity keeps the velocity field smooth.

use crate::grid::boundary::{BoundaryConditions, MassBoundary};
use crate::grid::simulation_grid::SimulationGrid;
use crate::solver::thermal::SolverError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Reference-temperature mode for the Boussinesq buoyancy force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuoyancyApproximation {
    /// Deviation from the average temperature of every fluid cell.
    #[default]
    AllCell,
    /// Deviation from the average temperature of the cell's own column.
    Column,
}

/// Direction of the gravity vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GravityType {
    /// Gravity points down (+y).
    #[default]
    Uniform,
    /// Gravity points toward the domain center (planet-in-a-box scenarios).
    Centric,
}

/// Parameters for the convection step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvectionParams {
    /// Gravitational acceleration g (m/s²).
    pub gravity: f32,
    /// Thermal expansion coefficient β (1/K).
    pub thermal_expansion: f32,
    /// Kinematic viscosity (m²/s), smooths the velocity field.
    pub viscosity: f32,
    pub buoyancy: BuoyancyApproximation,
    pub gravity_type: GravityType,
}

impl Default for ConvectionParams {
    fn default() -> Self {
        ConvectionParams {
            gravity: 9.81,
            thermal_expansion: 2.5e-3,
            viscosity: 1.5e-5,
            buoyancy: BuoyancyApproximation::AllCell,
            gravity_type: GravityType::Uniform,
        }
    }
}

/// First-order upwind advection of `f` by the velocity field, fluid cells
/// only. Returns the advected copy.
#[allow(clippy::too_many_arguments)]
fn advect_upwind(
    f: &[f32],
    u: &[f32],
    v: &[f32],
    fluid: &[bool],
    nx: usize,
    ny: usize,
    ds: f32,
    dt: f32,
) -> Vec<f32> {
    (0..nx * ny)
        .into_par_iter()
        .map(|i| {
            if !fluid[i] {
                return f[i];
            }
            let x = i % nx;
            let y = i / nx;
            let mut df = 0.0;

            let ui = u[i];
            if ui > 0.0 && x > 0 {
                df += ui * (f[i] - f[i - 1]) / ds;
            } else if ui < 0.0 && x + 1 < nx {
                df += ui * (f[i + 1] - f[i]) / ds;
            }

            let vi = v[i];
            if vi > 0.0 && y > 0 {
                df += vi * (f[i] - f[i - nx]) / ds;
            } else if vi < 0.0 && y + 1 < ny {
                df += vi * (f[i + nx] - f[i]) / ds;
            }

            f[i] - dt * df
        })
        .collect()
}

/// Explicit 5-point viscous smoothing of a velocity component.
fn diffuse_velocity(
    f: &[f32],
    fluid: &[bool],
    nx: usize,
    ny: usize,
    ds: f32,
    dt: f32,
    viscosity: f32,
) -> Vec<f32> {
    let factor = viscosity * dt / (ds * ds);
    (0..nx * ny)
        .into_par_iter()
        .map(|i| {
            if !fluid[i] {
                return f[i];
            }
            let x = i % nx;
            let y = i / nx;
            let mut lap = 0.0;
            if x > 0 {
                lap += f[i - 1] - f[i];
            }
            if x + 1 < nx {
                lap += f[i + 1] - f[i];
            }
            if y > 0 {
                lap += f[i - nx] - f[i];
            }
            if y + 1 < ny {
                lap += f[i + nx] - f[i];
            }
            f[i] + factor * lap
        })
        .collect()
}

/// Advance temperature and velocity by one convection step.
///
/// # Errors
///
/// Returns [`SolverError::NonFiniteVelocity`] if the velocity field
/// diverges; fatal for the caller.
pub fn step_convection(
    grid: &mut SimulationGrid,
    bc: &BoundaryConditions,
    params: &ConvectionParams,
    dt: f32,
) -> Result<(), SolverError> {
    let nx = grid.nx();
    let ny = grid.ny();
    let ds = grid.cell_size();
    let n = nx * ny;

    // Transport by the current velocity field
    let t_new = advect_upwind(
        grid.t.as_slice(),
        grid.u.as_slice(),
        grid.v.as_slice(),
        &grid.fluid,
        nx,
        ny,
        ds,
        dt,
    );
    let u_new = advect_upwind(
        grid.u.as_slice(),
        grid.u.as_slice(),
        grid.v.as_slice(),
        &grid.fluid,
        nx,
        ny,
        ds,
        dt,
    );
    let v_new = advect_upwind(
        grid.v.as_slice(),
        grid.u.as_slice(),
        grid.v.as_slice(),
        &grid.fluid,
        nx,
        ny,
        ds,
        dt,
    );
    for i in 0..n {
        // Pinned cells keep their temperature through transport as well
        if !grid.fixed_mask[i] {
            grid.t.as_mut_slice()[i] = t_new[i];
        }
        grid.u.as_mut_slice()[i] = u_new[i];
        grid.v.as_mut_slice()[i] = v_new[i];
    }

    // Boussinesq buoyancy against the gravity direction
    apply_buoyancy(grid, params, dt);

    // Viscous smoothing
    let u_s = diffuse_velocity(grid.u.as_slice(), &grid.fluid, nx, ny, ds, dt, params.viscosity);
    let v_s = diffuse_velocity(grid.v.as_slice(), &grid.fluid, nx, ny, ds, dt, params.viscosity);
    grid.u.as_mut_slice().copy_from_slice(&u_s);
    grid.v.as_mut_slice().copy_from_slice(&v_s);

    // Solids carry no flow; fans impose theirs
    for i in 0..n {
        if !grid.fluid[i] {
            grid.u.as_mut_slice()[i] = 0.0;
            grid.v.as_mut_slice()[i] = 0.0;
        } else if grid.fan_mask[i] {
            grid.u.as_mut_slice()[i] = grid.fan_u[i];
            grid.v.as_mut_slice()[i] = grid.fan_v[i];
        }
    }

    enforce_mass_boundaries(grid, bc);

    if grid.u.all_finite() && grid.v.all_finite() {
        Ok(())
    } else {
        error!("convection step produced non-finite velocities");
        Err(SolverError::NonFiniteVelocity)
    }
}

/// Add the buoyancy body force to the velocity field.
fn apply_buoyancy(grid: &mut SimulationGrid, params: &ConvectionParams, dt: f32) {
    let nx = grid.nx();
    let ny = grid.ny();
    let gb = params.gravity * params.thermal_expansion;

    // Reference temperature per buoyancy mode
    let t = grid.t.as_slice();
    let fluid = &grid.fluid;
    let global_ref = {
        let mut sum = 0.0_f64;
        let mut count = 0usize;
        for i in 0..nx * ny {
            if fluid[i] {
                sum += f64::from(t[i]);
                count += 1;
            }
        }
        if count > 0 {
            (sum / count as f64) as f32
        } else {
            grid.background_temperature()
        }
    };
    let column_ref: Vec<f32> = match params.buoyancy {
        BuoyancyApproximation::AllCell => Vec::new(),
        BuoyancyApproximation::Column => (0..nx)
            .map(|x| {
                let mut sum = 0.0_f64;
                let mut count = 0usize;
                for y in 0..ny {
                    let i = y * nx + x;
                    if fluid[i] {
                        sum += f64::from(t[i]);
                        count += 1;
                    }
                }
                if count > 0 {
                    (sum / count as f64) as f32
                } else {
                    global_ref
                }
            })
            .collect(),
    };

    let center_x = grid.width() * 0.5;
    let center_y = grid.height() * 0.5;
    let cell = grid.cell_size();

    for y in 0..ny {
        for x in 0..nx {
            let i = y * nx + x;
            if !grid.fluid[i] || grid.fan_mask[i] {
                continue;
            }
            let t_ref = match params.buoyancy {
                BuoyancyApproximation::AllCell => global_ref,
                BuoyancyApproximation::Column => column_ref[x],
            };
            let accel = gb * (grid.t.as_slice()[i] - t_ref);
            match params.gravity_type {
                GravityType::Uniform => {
                    // Hot fluid rises: y points down
                    let v = grid.v.as_slice()[i];
                    grid.v.as_mut_slice()[i] = v - accel * dt;
                }
                GravityType::Centric => {
                    let px = (x as f32 + 0.5) * cell - center_x;
                    let py = (y as f32 + 0.5) * cell - center_y;
                    let r = (px * px + py * py).sqrt().max(1e-6);
                    // Gravity points inward, so buoyancy pushes hot fluid out
                    let u = grid.u.as_slice()[i];
                    let v = grid.v.as_slice()[i];
                    grid.u.as_mut_slice()[i] = u + accel * dt * px / r;
                    grid.v.as_mut_slice()[i] = v + accel * dt * py / r;
                }
            }
        }
    }
}

/// Apply the per-edge mass boundary rule to the velocity field.
pub fn enforce_mass_boundaries(grid: &mut SimulationGrid, bc: &BoundaryConditions) {
    let nx = grid.nx();
    let ny = grid.ny();

    for y in 0..ny {
        let left = grid.index(0, y);
        match bc.left.mass {
            MassBoundary::Reflective => grid.u.as_mut_slice()[left] = 0.0,
            MassBoundary::Stop => {
                grid.u.as_mut_slice()[left] = 0.0;
                grid.v.as_mut_slice()[left] = 0.0;
            }
            MassBoundary::Through => {}
        }
        let right = grid.index(nx - 1, y);
        match bc.right.mass {
            MassBoundary::Reflective => grid.u.as_mut_slice()[right] = 0.0,
            MassBoundary::Stop => {
                grid.u.as_mut_slice()[right] = 0.0;
                grid.v.as_mut_slice()[right] = 0.0;
            }
            MassBoundary::Through => {}
        }
    }
    for x in 0..nx {
        let top = grid.index(x, 0);
        match bc.top.mass {
            MassBoundary::Reflective => grid.v.as_mut_slice()[top] = 0.0,
            MassBoundary::Stop => {
                grid.u.as_mut_slice()[top] = 0.0;
                grid.v.as_mut_slice()[top] = 0.0;
            }
            MassBoundary::Through => {}
        }
        let bottom = grid.index(x, ny - 1);
        match bc.bottom.mass {
            MassBoundary::Reflective => grid.v.as_mut_slice()[bottom] = 0.0,
            MassBoundary::Stop => {
                grid.u.as_mut_slice()[bottom] = 0.0;
                grid.v.as_mut_slice()[bottom] = 0.0;
            }
            MassBoundary::Through => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::boundary::BoundaryConditions;

    #[test]
    fn test_hot_cell_rises_under_uniform_gravity() {
        let mut grid = SimulationGrid::new(9, 9, 1.0, 20.0);
        let bc = BoundaryConditions::adiabatic();
        let params = ConvectionParams::default();
        grid.t.set(4, 6, 200.0);

        step_convection(&mut grid, &bc, &params, 0.1).unwrap();

        // Buoyancy gives the hot cell an upward (negative y) velocity
        assert!(grid.v.get(4, 6) < 0.0);
    }

    #[test]
    fn test_centric_gravity_pushes_hot_outward() {
        let mut grid = SimulationGrid::new(9, 9, 1.0, 20.0);
        let bc = BoundaryConditions::adiabatic();
        let params = ConvectionParams {
            gravity_type: GravityType::Centric,
            ..ConvectionParams::default()
        };
        // Hot cell right of center moves further right
        grid.t.set(7, 4, 200.0);

        step_convection(&mut grid, &bc, &params, 0.1).unwrap();

        assert!(grid.u.get(7, 4) > 0.0);
    }

    #[test]
    fn test_advection_carries_heat_downstream() {
        let mut grid = SimulationGrid::new(9, 9, 1.0, 0.0);
        let bc = BoundaryConditions::adiabatic();
        let params = ConvectionParams {
            gravity: 0.0,
            ..ConvectionParams::default()
        };
        grid.t.set(3, 4, 100.0);
        grid.u.fill(2.0);

        step_convection(&mut grid, &bc, &params, 0.2).unwrap();

        // Upwind transport moves heat in +x; the downstream cell warms
        assert!(grid.t.get(4, 4) > 0.0);
        assert!(grid.t.get(3, 4) < 100.0);
    }

    #[test]
    fn test_solid_cells_carry_no_flow() {
        let mut grid = SimulationGrid::new(9, 9, 1.0, 0.0);
        let bc = BoundaryConditions::adiabatic();
        let params = ConvectionParams::default();
        let i = grid.index(4, 4);
        grid.fluid[i] = false;
        grid.u.fill(5.0);
        grid.t.set(4, 3, 50.0);

        step_convection(&mut grid, &bc, &params, 0.1).unwrap();

        assert_eq!(grid.u.get(4, 4), 0.0);
        assert_eq!(grid.v.get(4, 4), 0.0);
    }

    #[test]
    fn test_fan_cells_impose_velocity() {
        let mut grid = SimulationGrid::new(9, 9, 1.0, 0.0);
        let bc = BoundaryConditions::adiabatic();
        let params = ConvectionParams::default();
        let i = grid.index(2, 2);
        grid.fan_mask[i] = true;
        grid.fan_u[i] = 3.0;

        step_convection(&mut grid, &bc, &params, 0.1).unwrap();

        assert_eq!(grid.u.get(2, 2), 3.0);
    }

    #[test]
    fn test_reflective_boundary_zeroes_normal_velocity() {
        let mut grid = SimulationGrid::new(9, 9, 1.0, 0.0);
        let bc = BoundaryConditions::adiabatic();
        grid.u.fill(1.0);
        grid.v.fill(1.0);

        enforce_mass_boundaries(&mut grid, &bc);

        assert_eq!(grid.u.get(0, 4), 0.0);
        assert_eq!(grid.u.get(8, 4), 0.0);
        assert_eq!(grid.v.get(4, 0), 0.0);
        assert_eq!(grid.v.get(4, 8), 0.0);
        // Tangential components survive a reflective edge
        assert_eq!(grid.v.get(0, 4), 1.0);
    }

    #[test]
    fn test_stop_boundary_zeroes_both_components() {
        let mut grid = SimulationGrid::new(9, 9, 1.0, 0.0);
        let mut bc = BoundaryConditions::adiabatic();
        bc.left.mass = MassBoundary::Stop;
        grid.u.fill(1.0);
        grid.v.fill(1.0);

        enforce_mass_boundaries(&mut grid, &bc);

        assert_eq!(grid.u.get(0, 4), 0.0);
        assert_eq!(grid.v.get(0, 4), 0.0);
    }

    #[test]
    fn test_through_boundary_leaves_velocity() {
        let mut grid = SimulationGrid::new(9, 9, 1.0, 0.0);
        let mut bc = BoundaryConditions::adiabatic();
        bc.right.mass = MassBoundary::Through;
        grid.u.fill(1.0);

        enforce_mass_boundaries(&mut grid, &bc);

        assert_eq!(grid.u.get(8, 4), 1.0);
    }
}
