//! Sensors: point probes with an append-only time series.
//!
//! Each tick the simulation thread samples every sensor and appends a
//! (time, value) record. The render/export path runs on other threads, so
//! the series lives behind a lock and readers receive a snapshot copy; the
//! simulation thread never holds the lock for longer than one append.

use crate::core_types::vec2::Vec2;
use crate::grid::simulation_grid::SimulationGrid;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// What a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SensorKind {
    /// Local temperature (°C).
    Thermometer,
    /// Conductive heat flux −k∇T projected on the sensor orientation
    /// (W/m²). `angle` is radians from +x.
    HeatFluxSensor { angle: f32 },
    /// Wind speed |v| (m/s).
    Anemometer,
}

/// Sampling stencil: how many grid points around the sensor position are
/// averaged into one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stencil {
    /// The sensor point alone.
    #[default]
    One,
    /// Center plus the four nearest neighbors.
    Five,
    /// The full 3×3 block.
    Nine,
}

impl Stencil {
    /// Cell-unit offsets of the stencil points.
    fn offsets(self) -> &'static [(f32, f32)] {
        match self {
            Stencil::One => &[(0.0, 0.0)],
            Stencil::Five => &[(0.0, 0.0), (-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)],
            Stencil::Nine => &[
                (-1.0, -1.0),
                (0.0, -1.0),
                (1.0, -1.0),
                (-1.0, 0.0),
                (0.0, 0.0),
                (1.0, 0.0),
                (-1.0, 1.0),
                (0.0, 1.0),
                (1.0, 1.0),
            ],
        }
    }
}

/// One (time, value) sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Simulation time (s).
    pub time: f32,
    /// Measured value in the sensor's unit.
    pub value: f32,
}

/// A placed sensor and its time series.
#[derive(Debug)]
pub struct Sensor {
    /// What is measured.
    pub kind: SensorKind,
    /// Probe position (m).
    pub position: Vec2,
    /// Averaging stencil.
    pub stencil: Stencil,
    series: Mutex<Vec<SensorRecord>>,
}

impl Sensor {
    /// Create a sensor with an empty series.
    pub fn new(kind: SensorKind, position: Vec2, stencil: Stencil) -> Self {
        Sensor {
            kind,
            position,
            stencil,
            series: Mutex::new(Vec::new()),
        }
    }

    /// Sample the grid and append a record. Called once per tick by the
    /// simulation thread.
    pub fn sample(&self, grid: &SimulationGrid, time: f32) {
        let ds = grid.cell_size();
        let offsets = self.stencil.offsets();
        let mut sum = 0.0;
        for (ox, oy) in offsets {
            let p = Vec2::new(self.position.x + ox * ds, self.position.y + oy * ds);
            sum += self.measure(grid, p);
        }
        let value = sum / offsets.len() as f32;
        self.series
            .lock()
            .expect("sensor series poisoned")
            .push(SensorRecord { time, value });
    }

    fn measure(&self, grid: &SimulationGrid, p: Vec2) -> f32 {
        match self.kind {
            SensorKind::Thermometer => grid.sample_temperature(p),
            SensorKind::HeatFluxSensor { angle } => {
                let flux = grid.heat_flux(p);
                flux.x * angle.cos() + flux.y * angle.sin()
            }
            SensorKind::Anemometer => grid.sample_velocity(p).norm(),
        }
    }

    /// Most recent value, if any.
    pub fn latest(&self) -> Option<f32> {
        self.series
            .lock()
            .expect("sensor series poisoned")
            .last()
            .map(|r| r.value)
    }

    /// Snapshot of the whole series for graphing or export.
    pub fn series(&self) -> Vec<SensorRecord> {
        self.series.lock().expect("sensor series poisoned").clone()
    }

    /// Clear the series (simulation reset).
    pub fn clear(&self) {
        self.series.lock().expect("sensor series poisoned").clear();
    }
}
