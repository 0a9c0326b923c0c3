//! Per-tick view assembled from one telemetry snapshot.

use std::collections::HashSet;
use std::time::Instant;

use tracing::debug;

use crate::session::{Driver, ResultPosition, Session};
use crate::telemetry::TelemetrySnapshot;

/// Size of iRacing's per-car telemetry arrays.
pub const MAX_CAR_SLOTS: usize = 64;

/// Per-car arrays and session metadata for one computation.
///
/// Every per-car getter is length-safe: an index past the end of a short or
/// missing array reads as `None`.
#[derive(Debug, Clone)]
pub struct SessionContext<'a> {
    /// Roster indexed by car slot; gaps in the roster are `None`
    pub drivers: Vec<Option<&'a Driver>>,
    pub positions: Vec<i32>,
    pub class_positions: Vec<i32>,
    pub last_lap_times: Vec<f32>,
    /// `None` when the telemetry does not carry best laps at all
    pub best_lap_times: Option<Vec<f32>>,
    /// Already floored at 0
    pub laps_started: Vec<i32>,
    pub lap_dist_pct: Vec<f32>,
    pub is_pit_road: Vec<bool>,
    pub multiclass: bool,
    pub player_idx: Option<usize>,
    pub sessions: &'a [Session],
    pub current_session: Option<&'a Session>,
    pub current_session_num: Option<i32>,
    pub qualify_results: &'a [ResultPosition],
    pub session_time: Option<f64>,
    pub session_time_total: Option<f64>,
    pub session_laps_remain: Option<i32>,
    /// Clock reading the pit tracker measures exit windows against
    pub captured_at: Instant,
}

impl<'a> SessionContext<'a> {
    /// Gather everything the core reads. Returns `None` while the roster is empty.
    pub fn assemble(snapshot: &'a impl TelemetrySnapshot, captured_at: Instant) -> Option<Self> {
        let roster = snapshot.drivers();
        if roster.is_empty() {
            return None;
        }

        Some(Self {
            drivers: index_by_slot(roster),
            positions: snapshot.car_idx_position().unwrap_or_default(),
            class_positions: snapshot.car_idx_class_position().unwrap_or_default(),
            last_lap_times: snapshot.car_idx_last_lap_time().unwrap_or_default(),
            best_lap_times: snapshot.car_idx_best_lap_time(),
            laps_started: snapshot.car_idx_lap().unwrap_or_default().into_iter().map(|lap| lap.max(0)).collect(),
            lap_dist_pct: snapshot.car_idx_lap_dist_pct().unwrap_or_default(),
            is_pit_road: snapshot.car_idx_on_pit_road().unwrap_or_default(),
            multiclass: is_multiclass(roster),
            player_idx: snapshot.player_car_idx(),
            sessions: snapshot.sessions(),
            current_session: snapshot.current_session(),
            current_session_num: snapshot.current_session_num(),
            qualify_results: snapshot.qualify_results(),
            session_time: snapshot.session_time(),
            session_time_total: snapshot.session_time_total(),
            session_laps_remain: snapshot.session_laps_remain(),
            captured_at,
        })
    }

    /// Car slots with a roster entry.
    pub fn car_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.drivers.iter().enumerate().filter_map(|(idx, driver)| driver.is_some().then_some(idx))
    }

    pub fn driver(&self, idx: usize) -> Option<&'a Driver> {
        self.drivers.get(idx).copied().flatten()
    }

    pub fn position(&self, idx: usize) -> Option<i32> {
        self.positions.get(idx).copied()
    }

    pub fn class_position(&self, idx: usize) -> Option<i32> {
        self.class_positions.get(idx).copied()
    }

    pub fn last_lap_time(&self, idx: usize) -> Option<f64> {
        self.last_lap_times.get(idx).copied().map(f64::from)
    }

    pub fn best_lap_time(&self, idx: usize) -> Option<f64> {
        self.best_lap_times.as_ref()?.get(idx).copied().map(f64::from)
    }

    pub fn laps_started(&self, idx: usize) -> i32 {
        self.laps_started.get(idx).copied().unwrap_or(0)
    }

    /// Lap progress when it is a usable fraction.
    pub fn lap_dist(&self, idx: usize) -> Option<f64> {
        let dist = f64::from(*self.lap_dist_pct.get(idx)?);
        (dist.is_finite() && (0.0..=1.0).contains(&dist)).then_some(dist)
    }

    pub fn on_pit_road(&self, idx: usize) -> bool {
        self.is_pit_road.get(idx).copied().unwrap_or(false)
    }
}

fn index_by_slot(roster: &[Driver]) -> Vec<Option<&Driver>> {
    let mut slots = Vec::new();
    for (position, driver) in roster.iter().enumerate() {
        let idx = match driver.car_idx {
            Some(car_idx) => usize::try_from(car_idx).ok(),
            None => Some(position),
        };
        let Some(idx) = idx.filter(|&idx| idx < MAX_CAR_SLOTS) else {
            debug!(car_idx = ?driver.car_idx, name = %driver.user_name, "Skipping driver outside the car slot range");
            continue;
        };
        if slots.len() <= idx {
            slots.resize(idx + 1, None);
        }
        slots[idx] = Some(driver);
    }
    slots
}

/// More than one distinct class id among the competing cars.
pub fn is_multiclass(roster: &[Driver]) -> bool {
    roster
        .iter()
        .filter(|driver| !driver.is_pace_car())
        .filter_map(|driver| driver.car_class_id)
        .collect::<HashSet<_>>()
        .len()
        > 1
}
