//! Implicit heat conduction solver.
//!
//! The heat equation with volumetric sources:
//!
//! ```text
//! ρc ∂T/∂t = ∇·(k∇T) + q
//! ```
//!
//! is advanced by operator splitting: an implicit tridiagonal solve along x
//! for every row, then along y for every column, each carrying half of the
//! source term. Interface conductivities use the harmonic mean of the two
//! adjacent cells, so fluxes are continuous across material boundaries and
//! the scheme conserves Σ ρ·c·T on adiabatic domains.
//!
//! Dirichlet edges (and interior constant-temperature cells) are pinned to
//! identity rows and excluded from the unknowns; Neumann edges inject their
//! boundary flux into the right-hand side of the edge row.

use crate::core_types::part::Part;
use crate::grid::boundary::{BoundaryConditions, ThermalBoundary};
use crate::grid::simulation_grid::SimulationGrid;
use crate::solver::tdma;
use rayon::prelude::*;
use tracing::error;

/// Fatal solver failures. The PDE state is meaningless after any of these;
/// the orchestrator stops stepping and surfaces the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// A temperature became NaN or infinite during the diffusion solve.
    NonFiniteTemperature,
    /// A velocity component became NaN or infinite during convection.
    NonFiniteVelocity,
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::NonFiniteTemperature => {
                write!(f, "temperature field diverged to a non-finite value")
            }
            SolverError::NonFiniteVelocity => {
                write!(f, "velocity field diverged to a non-finite value")
            }
        }
    }
}

impl std::error::Error for SolverError {}

/// Fill the grid's volumetric source term from part power densities.
///
/// Photon deposition and manual heat injection write temperature directly;
/// view-factor exchange adds onto this buffer afterwards.
pub fn assemble_sources(parts: &[Part], grid: &mut SimulationGrid) {
    let n = grid.nx() * grid.ny();
    for i in 0..n {
        let q = match grid.source_part[i] {
            p if p >= 0 => parts[p as usize].effective_power(),
            _ => 0.0,
        };
        grid.power.as_mut_slice()[i] = q;
    }
}

/// Harmonic-mean interface conductivity between two cells.
#[inline]
fn interface_k(k1: f32, k2: f32) -> f32 {
    2.0 * k1 * k2 / (k1 + k2)
}

/// The pinned temperature for a cell, if it is a Dirichlet cell: either an
/// interior constant-temperature cell or a cell on a Dirichlet edge.
fn pinned(
    bc: &BoundaryConditions,
    fixed_mask: &[bool],
    fixed_t: &[f32],
    nx: usize,
    ny: usize,
    x: usize,
    y: usize,
) -> Option<f32> {
    let i = y * nx + x;
    if fixed_mask[i] {
        return Some(fixed_t[i]);
    }
    if x == 0 {
        if let ThermalBoundary::Dirichlet(t) = bc.left.thermal {
            return Some(t);
        }
    }
    if x == nx - 1 {
        if let ThermalBoundary::Dirichlet(t) = bc.right.thermal {
            return Some(t);
        }
    }
    if y == 0 {
        if let ThermalBoundary::Dirichlet(t) = bc.top.thermal {
            return Some(t);
        }
    }
    if y == ny - 1 {
        if let ThermalBoundary::Dirichlet(t) = bc.bottom.thermal {
            return Some(t);
        }
    }
    None
}

/// Advance temperature by one implicit diffusion step of `dt` seconds.
///
/// # Errors
///
/// Returns [`SolverError::NonFiniteTemperature`] if any cell diverges; the
/// caller must treat this as fatal.
pub fn step_diffusion(
    grid: &mut SimulationGrid,
    bc: &BoundaryConditions,
    dt: f32,
) -> Result<(), SolverError> {
    let nx = grid.nx();
    let ny = grid.ny();
    let ds = grid.cell_size();
    let ds2 = ds * ds;

    // x sweep: one independent tridiagonal system per row
    {
        let k = grid.conductivity.as_slice();
        let rho = grid.density.as_slice();
        let cp = grid.specific_heat.as_slice();
        let q = grid.power.as_slice();
        let fixed_mask = &grid.fixed_mask;
        let fixed_t = &grid.fixed_t;

        grid.t
            .as_mut_slice()
            .par_chunks_mut(nx)
            .enumerate()
            .for_each(|(y, row)| {
                let mut a = vec![0.0_f32; nx];
                let mut b = vec![0.0_f32; nx];
                let mut c = vec![0.0_f32; nx];
                let mut d = vec![0.0_f32; nx];
                let mut x_out = vec![0.0_f32; nx];

                for x in 0..nx {
                    let i = y * nx + x;
                    if let Some(t) = pinned(bc, fixed_mask, fixed_t, nx, ny, x, y) {
                        a[x] = 0.0;
                        b[x] = 1.0;
                        c[x] = 0.0;
                        d[x] = t;
                        continue;
                    }
                    let rc = rho[i] * cp[i];
                    let lw = if x > 0 {
                        dt * interface_k(k[i - 1], k[i]) / (rc * ds2)
                    } else {
                        0.0
                    };
                    let le = if x + 1 < nx {
                        dt * interface_k(k[i], k[i + 1]) / (rc * ds2)
                    } else {
                        0.0
                    };
                    a[x] = -lw;
                    c[x] = -le;
                    b[x] = 1.0 + lw + le;
                    d[x] = row[x] + 0.5 * dt * q[i] / rc;
                    if x == 0 {
                        if let ThermalBoundary::Neumann(flux) = bc.left.thermal {
                            d[x] += dt * flux / (rc * ds);
                        }
                    }
                    if x == nx - 1 {
                        if let ThermalBoundary::Neumann(flux) = bc.right.thermal {
                            d[x] += dt * flux / (rc * ds);
                        }
                    }
                }

                tdma::solve_in_place(&a, &b, &mut c, &mut d, &mut x_out);
                row.copy_from_slice(&x_out);
            });
    }

    // y sweep: one independent tridiagonal system per column
    {
        let t_in = grid.t.as_slice();
        let k = grid.conductivity.as_slice();
        let rho = grid.density.as_slice();
        let cp = grid.specific_heat.as_slice();
        let q = grid.power.as_slice();
        let fixed_mask = &grid.fixed_mask;
        let fixed_t = &grid.fixed_t;

        let columns: Vec<Vec<f32>> = (0..nx)
            .into_par_iter()
            .map(|x| {
                let mut a = vec![0.0_f32; ny];
                let mut b = vec![0.0_f32; ny];
                let mut c = vec![0.0_f32; ny];
                let mut d = vec![0.0_f32; ny];
                let mut x_out = vec![0.0_f32; ny];

                for y in 0..ny {
                    let i = y * nx + x;
                    if let Some(t) = pinned(bc, fixed_mask, fixed_t, nx, ny, x, y) {
                        a[y] = 0.0;
                        b[y] = 1.0;
                        c[y] = 0.0;
                        d[y] = t;
                        continue;
                    }
                    let rc = rho[i] * cp[i];
                    let ln = if y > 0 {
                        dt * interface_k(k[i - nx], k[i]) / (rc * ds2)
                    } else {
                        0.0
                    };
                    let ls = if y + 1 < ny {
                        dt * interface_k(k[i], k[i + nx]) / (rc * ds2)
                    } else {
                        0.0
                    };
                    a[y] = -ln;
                    c[y] = -ls;
                    b[y] = 1.0 + ln + ls;
                    d[y] = t_in[i] + 0.5 * dt * q[i] / rc;
                    if y == 0 {
                        if let ThermalBoundary::Neumann(flux) = bc.top.thermal {
                            d[y] += dt * flux / (rc * ds);
                        }
                    }
                    if y == ny - 1 {
                        if let ThermalBoundary::Neumann(flux) = bc.bottom.thermal {
                            d[y] += dt * flux / (rc * ds);
                        }
                    }
                }

                tdma::solve_in_place(&a, &b, &mut c, &mut d, &mut x_out);
                x_out
            })
            .collect();

        for (x, col) in columns.iter().enumerate() {
            for (y, &value) in col.iter().enumerate() {
                grid.t.as_mut_slice()[y * nx + x] = value;
            }
        }
    }

    if grid.t.all_finite() {
        Ok(())
    } else {
        error!("diffusion step produced non-finite temperatures");
        Err(SolverError::NonFiniteTemperature)
    }
}

/// Relax temperature toward the background at the z-diffusivity rate,
/// modeling heat loss through the unmodeled third dimension.
pub fn apply_z_heat_loss(grid: &mut SimulationGrid, dt: f32, z_diffusivity: f32, fluid_only: bool) {
    let n = grid.nx() * grid.ny();
    let background = grid.background_temperature();
    for i in 0..n {
        if grid.fixed_mask[i] || (fluid_only && !grid.fluid[i]) {
            continue;
        }
        let t = grid.t.as_slice()[i];
        grid.t.as_mut_slice()[i] = t - z_diffusivity * (t - background) * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_grid(n: usize) -> SimulationGrid {
        SimulationGrid::new(n, n, 1.0, 0.0)
    }

    #[test]
    fn test_diffusion_smooths_hot_spot() {
        let mut grid = uniform_grid(9);
        let bc = BoundaryConditions::adiabatic();
        grid.t.set(4, 4, 100.0);

        step_diffusion(&mut grid, &bc, 1.0).unwrap();

        assert!(grid.t.get(4, 4) < 100.0, "hot spot should cool");
        assert!(grid.t.get(3, 4) > 0.0, "neighbor should warm");
    }

    #[test]
    fn test_adiabatic_step_conserves_energy() {
        let mut grid = uniform_grid(16);
        let bc = BoundaryConditions::adiabatic();
        grid.t.set(8, 8, 500.0);
        grid.t.set(3, 12, -200.0);

        let before = grid.total_thermal_energy();
        for _ in 0..20 {
            step_diffusion(&mut grid, &bc, 0.5).unwrap();
        }
        let after = grid.total_thermal_energy();

        let rel = ((after - before) / before).abs();
        assert!(rel < 1e-3, "energy drifted by {rel}");
    }

    #[test]
    fn test_dirichlet_edges_are_pinned() {
        let mut grid = uniform_grid(8);
        let mut bc = BoundaryConditions::default();
        bc.left.thermal = ThermalBoundary::Dirichlet(50.0);
        bc.right.thermal = ThermalBoundary::Dirichlet(-10.0);
        bc.top.thermal = ThermalBoundary::Neumann(0.0);
        bc.bottom.thermal = ThermalBoundary::Neumann(0.0);

        step_diffusion(&mut grid, &bc, 1.0).unwrap();

        for y in 0..8 {
            assert_eq!(grid.t.get(0, y), 50.0);
            assert_eq!(grid.t.get(7, y), -10.0);
        }
    }

    #[test]
    fn test_neumann_flux_heats_edge() {
        let mut grid = uniform_grid(8);
        let mut bc = BoundaryConditions::adiabatic();
        bc.left.thermal = ThermalBoundary::Neumann(1000.0);

        let before = grid.total_thermal_energy();
        step_diffusion(&mut grid, &bc, 1.0).unwrap();
        let after = grid.total_thermal_energy();

        assert!(after > before, "incoming flux must add energy");
        assert!(grid.t.get(0, 4) > grid.t.get(7, 4));
    }

    #[test]
    fn test_interior_fixed_cell_holds_temperature() {
        let mut grid = uniform_grid(8);
        let bc = BoundaryConditions::adiabatic();
        let i = grid.index(4, 4);
        grid.fixed_mask[i] = true;
        grid.fixed_t[i] = 300.0;
        grid.t.set(4, 4, 300.0);

        for _ in 0..10 {
            step_diffusion(&mut grid, &bc, 1.0).unwrap();
        }

        assert_eq!(grid.t.get(4, 4), 300.0);
        assert!(grid.t.get(5, 4) > 0.0, "heat must leak out of the pin");
    }

    #[test]
    fn test_source_assembly_respects_power_switch() {
        use crate::core_types::material::Material;
        use crate::core_types::optics::OpticalProps;
        use crate::core_types::shape::Shape;
        use crate::grid::rasterize::rasterize;

        let mut grid = uniform_grid(8);
        let mut part = Part::new(
            Shape::Rectangle {
                x: 2.0,
                y: 2.0,
                w: 2.0,
                h: 2.0,
            },
            Material::new(1.0, 1000.0, 1000.0).unwrap(),
            OpticalProps::opaque(),
        )
        .unwrap();
        part.set_power(5000.0);
        let mut parts = vec![part];
        rasterize(&parts, &mut grid);

        assemble_sources(&parts, &mut grid);
        assert_eq!(grid.power.get(2, 2), 5000.0);
        assert_eq!(grid.power.get(6, 6), 0.0);

        parts[0].set_power_on(false);
        assemble_sources(&parts, &mut grid);
        assert_eq!(grid.power.get(2, 2), 0.0);
    }

    #[test]
    fn test_z_heat_loss_relaxes_toward_background() {
        let mut grid = SimulationGrid::new(8, 8, 1.0, 20.0);
        grid.t.fill(100.0);
        apply_z_heat_loss(&mut grid, 1.0, 0.1, false);
        let t = grid.t.get(4, 4);
        assert!((t - 92.0).abs() < 1e-4, "expected 100 - 0.1*80 = 92, got {t}");
    }

    #[test]
    fn test_z_heat_loss_fluid_only_skips_solids() {
        let mut grid = SimulationGrid::new(8, 8, 1.0, 20.0);
        grid.t.fill(100.0);
        let i = grid.index(4, 4);
        grid.fluid[i] = false;
        apply_z_heat_loss(&mut grid, 1.0, 0.1, true);
        assert_eq!(grid.t.get(4, 4), 100.0);
        assert!(grid.t.get(5, 5) < 100.0);
    }
}
