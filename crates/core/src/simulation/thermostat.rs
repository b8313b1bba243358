//! Thermostats: two-state hysteresis controllers over part power sources.
//!
//! A thermostat binds one sensor to one power source. When the sensor's
//! latest reading rises above `setpoint + deadband/2` the source switches
//! off; below `setpoint − deadband/2` it switches on; inside the deadband
//! the previous state is retained, so a reading oscillating strictly within
//! the band never toggles the source.

use crate::core_types::error::ValidationError;
use crate::core_types::part::{Part, PartId};
use crate::simulation::sensors::Sensor;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A (sensor, power source) pair with setpoint and deadband.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thermostat {
    /// Index of the driving sensor.
    pub sensor: usize,
    /// Controlled part.
    pub part: PartId,
    /// Target value in the sensor's unit (°C for thermometers).
    pub setpoint: f32,
    /// Full width of the hysteresis band.
    pub deadband: f32,
    /// Current switch state.
    on: bool,
}

impl Thermostat {
    /// Create a thermostat, initially on.
    ///
    /// # Errors
    ///
    /// Rejects a negative deadband.
    pub fn new(
        sensor: usize,
        part: PartId,
        setpoint: f32,
        deadband: f32,
    ) -> Result<Self, ValidationError> {
        if !deadband.is_finite() || deadband < 0.0 {
            return Err(ValidationError::NegativeDeadband(deadband));
        }
        Ok(Thermostat {
            sensor,
            part,
            setpoint,
            deadband,
            on: true,
        })
    }

    /// Current switch state.
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Evaluate the hysteresis rule for one reading. Returns the new state.
    fn evaluate(&mut self, reading: f32) -> bool {
        let half = self.deadband * 0.5;
        if reading > self.setpoint + half {
            self.on = false;
        } else if reading < self.setpoint - half {
            self.on = true;
        }
        self.on
    }
}

/// The set of active thermostats, at most one per power source.
///
/// A sensor may drive any number of thermostats; binding a second controller
/// to the same part replaces the first.
#[derive(Debug, Clone, Default)]
pub struct ThermostatBank {
    controllers: Vec<Thermostat>,
    by_part: FxHashMap<PartId, usize>,
}

impl ThermostatBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a thermostat. If the part already had a controller, the old one
    /// is replaced.
    pub fn bind(&mut self, thermostat: Thermostat) {
        if let Some(&slot) = self.by_part.get(&thermostat.part) {
            debug!("replacing thermostat on part {}", thermostat.part);
            self.controllers[slot] = thermostat;
        } else {
            self.by_part.insert(thermostat.part, self.controllers.len());
            self.controllers.push(thermostat);
        }
    }

    /// Remove the controller bound to `part`, if any.
    pub fn unbind(&mut self, part: PartId) {
        if let Some(slot) = self.by_part.remove(&part) {
            self.controllers.swap_remove(slot);
            if slot < self.controllers.len() {
                let moved = self.controllers[slot].part;
                self.by_part.insert(moved, slot);
            }
        }
    }

    /// Active controllers.
    pub fn controllers(&self) -> &[Thermostat] {
        &self.controllers
    }

    /// Evaluate every controller against its sensor's latest reading and
    /// toggle the controlled parts.
    pub fn update(&mut self, sensors: &[Sensor], parts: &mut [Part]) {
        for t in &mut self.controllers {
            let Some(sensor) = sensors.get(t.sensor) else {
                continue;
            };
            let Some(reading) = sensor.latest() else {
                continue;
            };
            let on = t.evaluate(reading);
            if let Some(part) = parts.get_mut(t.part) {
                part.set_power_on(on);
            }
        }
    }
}
