//! Pit stop memory carried between ticks.
//!
//! Per car the label walks through
//!
//! ```text
//! never pitted ──▶ IN L{n} ──▶ OUT L{n} ──(exit window)──▶ L{n}
//!                    ▲            │                          │
//!                    └────────────┴──────────────────────────┘
//! ```
//!
//! and re-entering pit road always goes back to `IN`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Last pit lap and pit exit time per car slot.
#[derive(Debug, Clone)]
pub struct PitTracker {
    last_pit_laps: HashMap<usize, i32>,
    exit_times: HashMap<usize, Instant>,
    exit_window: Duration,
}

impl PitTracker {
    pub fn new(exit_window: Duration) -> Self {
        Self { last_pit_laps: HashMap::new(), exit_times: HashMap::new(), exit_window }
    }

    /// Advance the state of one car and return its label.
    pub fn observe(&mut self, car_idx: usize, lap: i32, on_pit_road: bool, now: Instant) -> Option<String> {
        if on_pit_road {
            self.last_pit_laps.insert(car_idx, lap);
            self.exit_times.remove(&car_idx);
            return Some(format!("IN L{lap}"));
        }

        let pit_lap = *self.last_pit_laps.get(&car_idx)?;
        let exited_at = *self.exit_times.entry(car_idx).or_insert(now);
        if now.saturating_duration_since(exited_at) < self.exit_window {
            Some(format!("OUT L{pit_lap}"))
        } else {
            Some(format!("L{pit_lap}"))
        }
    }

    /// Forget every car, e.g. when a new session starts.
    pub fn reset(&mut self) {
        self.last_pit_laps.clear();
        self.exit_times.clear();
    }

    /// Number of cars seen on pit road since the last reset.
    pub fn tracked_cars(&self) -> usize {
        self.last_pit_laps.len()
    }
}
