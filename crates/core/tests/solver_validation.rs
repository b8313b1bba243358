//! Solver validation test suite
//!
//! Validates the numerical core against closed-form expectations:
//! steady-state conduction profiles, energy conservation on adiabatic
//! domains, and the grid material invariants after rasterization.
//!
//! Run tests with: `cargo test --test solver_validation`

use approx::assert_relative_eq;
use heatlab_core::grid::{rasterize, BoundaryConditions, SimulationGrid, ThermalBoundary};
use heatlab_core::solver::{step_diffusion, SolverError};
use heatlab_core::{Material, OpticalProps, Part, Shape};

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: STEADY-STATE CONDUCTION
// ═══════════════════════════════════════════════════════════════════════════

/// A domain held at 0°C on the left and 100°C on the right, with adiabatic
/// top/bottom and no sources, must converge to a linear temperature profile.
#[test]
fn test_steady_state_is_linear_between_dirichlet_edges() {
    let nx = 16;
    let ny = 8;
    let mut grid = SimulationGrid::new(nx, ny, 1.0, 0.0);
    let mut bc = BoundaryConditions::adiabatic();
    bc.left.thermal = ThermalBoundary::Dirichlet(0.0);
    bc.right.thermal = ThermalBoundary::Dirichlet(100.0);

    // Air diffuses slowly; a large implicit step is unconditionally stable
    // and drives the field to steady state quickly.
    let dt = 1.0e6;
    for _ in 0..3000 {
        step_diffusion(&mut grid, &bc, dt).expect("diffusion must stay finite");
    }

    for y in 0..ny {
        for x in 0..nx {
            let expected = 100.0 * x as f32 / (nx - 1) as f32;
            let actual = grid.t.get(x, y);
            assert!(
                (actual - expected).abs() < 0.5,
                "cell ({x}, {y}): expected {expected:.2}, got {actual:.2}"
            );
        }
    }
}

/// The steady profile through two materials of different conductivity is
/// piecewise linear with the steeper gradient in the poorer conductor.
#[test]
fn test_steady_state_gradient_steeper_in_insulator() {
    let nx = 16;
    let ny = 6;
    let mut grid = SimulationGrid::new(nx, ny, 1.0, 0.0);
    let mut bc = BoundaryConditions::adiabatic();
    bc.left.thermal = ThermalBoundary::Dirichlet(0.0);
    bc.right.thermal = ThermalBoundary::Dirichlet(100.0);

    // Left half conductive, right half insulating
    let conductor = Part::new(
        Shape::Rectangle {
            x: 0.0,
            y: 0.0,
            w: 8.0,
            h: 6.0,
        },
        Material::new(10.0, 1000.0, 1000.0).unwrap(),
        OpticalProps::opaque(),
    )
    .unwrap();
    let insulator = Part::new(
        Shape::Rectangle {
            x: 8.0,
            y: 0.0,
            w: 8.0,
            h: 6.0,
        },
        Material::new(0.1, 1000.0, 1000.0).unwrap(),
        OpticalProps::opaque(),
    )
    .unwrap();
    rasterize(&[conductor, insulator], &mut grid);

    let dt = 1.0e6;
    for _ in 0..5000 {
        step_diffusion(&mut grid, &bc, dt).expect("diffusion must stay finite");
    }

    let drop_conductor = grid.t.get(7, 3) - grid.t.get(1, 3);
    let drop_insulator = grid.t.get(14, 3) - grid.t.get(9, 3);
    assert!(
        drop_insulator > 5.0 * drop_conductor,
        "insulator must carry most of the temperature drop \
         (conductor {drop_conductor:.2}, insulator {drop_insulator:.2})"
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: ENERGY CONSERVATION
// ═══════════════════════════════════════════════════════════════════════════

/// An adiabatic domain with no sources keeps Σ ρ·c·T·cellArea constant.
#[test]
fn test_adiabatic_domain_conserves_energy() {
    let mut grid = SimulationGrid::new(24, 24, 0.5, 0.0);
    let bc = BoundaryConditions::adiabatic();

    // Arbitrary non-uniform initial condition
    for y in 0..24 {
        for x in 0..24 {
            let value = 20.0 + 300.0 * f32::exp(-((x as f32 - 12.0).powi(2) + (y as f32 - 7.0).powi(2)) / 8.0);
            grid.t.set(x, y, value);
        }
    }

    let initial = grid.total_thermal_energy();
    for _ in 0..500 {
        step_diffusion(&mut grid, &bc, 1.0e4).expect("diffusion must stay finite");
    }
    let final_energy = grid.total_thermal_energy();

    assert_relative_eq!(final_energy, initial, max_relative = 1e-3);
}

/// Conservation holds across material interfaces too: the harmonic-mean
/// interface flux is what leaves one cell and enters the other.
#[test]
fn test_energy_conserved_across_material_interface() {
    let mut grid = SimulationGrid::new(16, 16, 1.0, 0.0);
    let bc = BoundaryConditions::adiabatic();

    let block = Part::new(
        Shape::Rectangle {
            x: 4.0,
            y: 4.0,
            w: 8.0,
            h: 8.0,
        },
        Material::new(100.0, 5000.0, 500.0).unwrap(),
        OpticalProps::opaque(),
    )
    .unwrap();
    rasterize(&[block], &mut grid);
    for y in 6..10 {
        for x in 6..10 {
            grid.t.set(x, y, 400.0);
        }
    }

    let initial = grid.total_thermal_energy();
    for _ in 0..300 {
        step_diffusion(&mut grid, &bc, 5.0e3).expect("diffusion must stay finite");
    }
    let final_energy = grid.total_thermal_energy();

    assert_relative_eq!(final_energy, initial, max_relative = 1e-3);
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 3: INVARIANTS AND FAILURE MODES
// ═══════════════════════════════════════════════════════════════════════════

/// Material invariants survive rasterization, including a part whose
/// conductivity was floored at construction.
#[test]
fn test_grid_invariants_after_rasterization() {
    let mut grid = SimulationGrid::new(20, 20, 0.5, 20.0);

    let zero_k = Part::new(
        Shape::Ellipse {
            cx: 5.0,
            cy: 5.0,
            rx: 2.0,
            ry: 1.5,
        },
        // Conductivity 0 is floored, never stored
        Material::new(0.0, 800.0, 2000.0).unwrap(),
        OpticalProps::opaque(),
    )
    .unwrap();
    let dense = Part::new(
        Shape::Annulus {
            cx: 3.0,
            cy: 7.0,
            inner: 0.5,
            outer: 1.5,
        },
        Material::new(400.0, 9000.0, 390.0).unwrap(),
        OpticalProps::opaque(),
    )
    .unwrap();
    rasterize(&[zero_k, dense], &mut grid);

    assert!(
        grid.materials_valid(),
        "k >= ε, ρ > 0, c > 0 must hold for every cell"
    );
}

/// Optical property sums are enforced for every part that can be built.
#[test]
fn test_part_optics_invariant() {
    for (a, r, t) in [(1.0, 0.0, 0.0), (0.3, 0.3, 0.4), (0.5, 0.25, 0.255)] {
        let optics = OpticalProps::new(a, r, t, 0.5).unwrap();
        let sum = optics.absorptivity() + optics.reflectivity() + optics.transmissivity();
        assert!((sum - 1.0).abs() < 0.01);
    }
    assert!(OpticalProps::new(0.8, 0.3, 0.2, 0.5).is_err());
}

/// A poisoned temperature field is reported as a fatal error, not silently
/// propagated.
#[test]
fn test_non_finite_temperature_is_fatal() {
    let mut grid = SimulationGrid::new(8, 8, 1.0, 0.0);
    let bc = BoundaryConditions::adiabatic();
    grid.t.set(4, 4, f32::NAN);

    let result = step_diffusion(&mut grid, &bc, 1.0);
    assert_eq!(result, Err(SolverError::NonFiniteTemperature));
}
