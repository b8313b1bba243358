//! Simulation orchestration: configuration, the tick engine, and the
//! sensor/thermostat control loop.

pub mod config;
pub mod engine;
pub mod heat_queue;
pub mod sensors;
pub mod thermostat;

pub use config::SimulationConfig;
pub use engine::Simulation;
pub use heat_queue::{HeatPulse, HeatQueue};
pub use sensors::{Sensor, SensorKind, SensorRecord, Stencil};
pub use thermostat::{Thermostat, ThermostatBank};
