//! The simulation grid: field arrays plus per-cell material and masks.
//!
//! The grid owns every discretized quantity the solvers read and write:
//! temperature, fluid velocity, material properties, the assembled volumetric
//! source term, and the per-cell masks produced by rasterization (fluid
//! cells, interior Dirichlet cells, fan cells, power-source ownership).
//! It has no time-stepping behavior of its own.
//!
//! Geometry convention: cell (x, y) is centered at
//! `((x + 0.5)·Δ, (y + 0.5)·Δ)` with the y axis pointing down.

use crate::core_types::material::{Material, MIN_CONDUCTIVITY};
use crate::core_types::vec2::Vec2;
use crate::grid::field::Field;
use serde::{Deserialize, Serialize};

/// Sentinel for "no part owns this cell" in the source-part map.
pub const NO_PART: i32 = -1;

/// Per-cell state for the whole rectangular domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationGrid {
    nx: usize,
    ny: usize,
    /// Cell edge length (m); cells are square.
    cell_size: f32,
    /// Ambient temperature used for initialization, reset, and z-loss (°C).
    background_temperature: f32,

    /// Temperature (°C).
    pub t: Field,
    /// x velocity (m/s).
    pub u: Field,
    /// y velocity (m/s), positive downward.
    pub v: Field,
    /// Thermal conductivity k (W/(m·K)), always >= [`MIN_CONDUCTIVITY`].
    pub conductivity: Field,
    /// Density ρ (kg/m³), always > 0.
    pub density: Field,
    /// Specific heat c (J/(kg·K)), always > 0.
    pub specific_heat: Field,
    /// Assembled volumetric source term q for the current tick (W/m³).
    pub power: Field,

    /// True for cells not covered by any solid part.
    pub fluid: Vec<bool>,
    /// True for interior Dirichlet cells (constant-temperature parts).
    pub fixed_mask: Vec<bool>,
    /// Pinned temperature for fixed cells (°C); unused elsewhere.
    pub fixed_t: Vec<f32>,
    /// True for cells inside a fan part.
    pub fan_mask: Vec<bool>,
    /// Imposed fan velocity for fan cells (m/s).
    pub fan_u: Vec<f32>,
    /// Imposed fan velocity for fan cells (m/s).
    pub fan_v: Vec<f32>,
    /// Index of the part whose power density drives each cell, or
    /// [`NO_PART`]. Lets thermostats toggle sources without re-rasterizing.
    pub source_part: Vec<i32>,
}

impl SimulationGrid {
    /// Create a grid filled with background material (air) at the background
    /// temperature.
    pub fn new(nx: usize, ny: usize, cell_size: f32, background_temperature: f32) -> Self {
        assert!(nx >= 3 && ny >= 3, "grid must be at least 3x3 cells");
        assert!(cell_size > 0.0, "cell size must be positive");
        let air = Material::air();
        let n = nx * ny;
        SimulationGrid {
            nx,
            ny,
            cell_size,
            background_temperature,
            t: Field::with_value(nx, ny, background_temperature),
            u: Field::new(nx, ny),
            v: Field::new(nx, ny),
            conductivity: Field::with_value(nx, ny, air.conductivity()),
            density: Field::with_value(nx, ny, air.density()),
            specific_heat: Field::with_value(nx, ny, air.specific_heat()),
            power: Field::new(nx, ny),
            fluid: vec![true; n],
            fixed_mask: vec![false; n],
            fixed_t: vec![0.0; n],
            fan_mask: vec![false; n],
            fan_u: vec![0.0; n],
            fan_v: vec![0.0; n],
            source_part: vec![NO_PART; n],
        }
    }

    /// Grid width in cells.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Grid height in cells.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Cell edge length (m).
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Domain width (m).
    pub fn width(&self) -> f32 {
        self.nx as f32 * self.cell_size
    }

    /// Domain height (m).
    pub fn height(&self) -> f32 {
        self.ny as f32 * self.cell_size
    }

    /// Background temperature (°C).
    pub fn background_temperature(&self) -> f32 {
        self.background_temperature
    }

    /// Flat index for (x, y).
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.nx + x
    }

    /// World position of a cell center (m).
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * self.cell_size,
            (y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Fractional cell coordinates for a world position; integer values land
    /// on cell centers.
    pub fn grid_coords(&self, p: Vec2) -> (f32, f32) {
        (
            p.x / self.cell_size - 0.5,
            p.y / self.cell_size - 0.5,
        )
    }

    /// Cell indices containing a world position, clamped to the grid.
    pub fn cell_containing(&self, p: Vec2) -> (usize, usize) {
        let x = (p.x / self.cell_size).floor().max(0.0) as usize;
        let y = (p.y / self.cell_size).floor().max(0.0) as usize;
        (x.min(self.nx - 1), y.min(self.ny - 1))
    }

    /// True if the world position lies inside the domain.
    pub fn in_domain(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x < self.width() && p.y >= 0.0 && p.y < self.height()
    }

    /// Bilinearly interpolated temperature at a world position (°C).
    pub fn sample_temperature(&self, p: Vec2) -> f32 {
        let (gx, gy) = self.grid_coords(p);
        self.t.bilinear(gx, gy)
    }

    /// Bilinearly interpolated fluid velocity at a world position (m/s).
    pub fn sample_velocity(&self, p: Vec2) -> Vec2 {
        let (gx, gy) = self.grid_coords(p);
        Vec2::new(self.u.bilinear(gx, gy), self.v.bilinear(gx, gy))
    }

    /// Temperature gradient ∇T at a world position (°C/m).
    pub fn temperature_gradient(&self, p: Vec2) -> Vec2 {
        let (gx, gy) = self.grid_coords(p);
        let (dx, dy) = self.t.gradient_at(gx, gy);
        Vec2::new(dx / self.cell_size, dy / self.cell_size)
    }

    /// Conductive heat flux −k∇T at a world position (W/m²).
    pub fn heat_flux(&self, p: Vec2) -> Vec2 {
        let (gx, gy) = self.grid_coords(p);
        let k = self.conductivity.bilinear(gx, gy);
        -self.temperature_gradient(p) * k
    }

    /// Total thermal energy Σ ρ·c·T·cellArea over the domain (J per meter of
    /// depth).
    pub fn total_thermal_energy(&self) -> f64 {
        let area = f64::from(self.cell_size) * f64::from(self.cell_size);
        let mut sum = 0.0_f64;
        for i in 0..self.nx * self.ny {
            sum += f64::from(self.density.as_slice()[i])
                * f64::from(self.specific_heat.as_slice()[i])
                * f64::from(self.t.as_slice()[i]);
        }
        sum * area
    }

    /// Deposit a point energy quantum (J) into the cell containing `p`,
    /// raising its temperature by E / (ρ·c·cellArea).
    pub fn deposit_heat(&mut self, p: Vec2, energy: f32) {
        let (x, y) = self.cell_containing(p);
        let i = self.index(x, y);
        let heat_capacity = self.density.as_slice()[i]
            * self.specific_heat.as_slice()[i]
            * self.cell_size
            * self.cell_size;
        let dt = energy / heat_capacity.max(1e-12);
        let t = self.t.get(x, y);
        self.t.set(x, y, t + dt);
    }

    /// True if every cell satisfies the material invariants
    /// (k >= ε, ρ > 0, c > 0).
    pub fn materials_valid(&self) -> bool {
        let n = self.nx * self.ny;
        (0..n).all(|i| {
            self.conductivity.as_slice()[i] >= MIN_CONDUCTIVITY
                && self.density.as_slice()[i] > 0.0
                && self.specific_heat.as_slice()[i] > 0.0
        })
    }

    /// Reinitialize the dynamic state: temperature back to background,
    /// velocities and sources zeroed. Material arrays and masks are left for
    /// the caller to re-rasterize.
    pub fn reset(&mut self) {
        self.t.fill(self.background_temperature);
        self.u.fill(0.0);
        self.v.fill(0.0);
        self.power.fill(0.0);
        // Pinned cells come back at their pinned value
        for y in 0..self.ny {
            for x in 0..self.nx {
                let i = self.index(x, y);
                if self.fixed_mask[i] {
                    self.t.set(x, y, self.fixed_t[i]);
                }
            }
        }
    }
}
