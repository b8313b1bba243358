//! Cross-thread point-heat command queue.
//!
//! The "press and hold to heat" interaction runs on the UI thread while the
//! simulation thread owns all grid state. Instead of sharing the
//! temperature field, the interaction thread enqueues point-heat deltas
//! here; the simulation thread drains the queue at the start of each tick
//! under its normal single-writer discipline.

use crate::core_types::vec2::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// One point-heat delta to apply at a world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPulse {
    /// Where to deposit (m).
    pub position: Vec2,
    /// Energy to deposit (J); negative values cool.
    pub energy: f32,
}

/// Shared handle to the pulse queue. Cloning is cheap and every clone
/// feeds the same queue.
#[derive(Debug, Clone, Default)]
pub struct HeatQueue {
    pending: Arc<Mutex<Vec<HeatPulse>>>,
}

impl HeatQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a pulse. Callable from any thread.
    pub fn push(&self, pulse: HeatPulse) {
        self.pending
            .lock()
            .expect("heat queue poisoned")
            .push(pulse);
    }

    /// Take all pending pulses, leaving the queue empty.
    pub fn drain(&self) -> Vec<HeatPulse> {
        std::mem::take(&mut *self.pending.lock().expect("heat queue poisoned"))
    }

    /// Number of pending pulses.
    pub fn len(&self) -> usize {
        self.pending.lock().expect("heat queue poisoned").len()
    }

    /// True when no pulses are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
