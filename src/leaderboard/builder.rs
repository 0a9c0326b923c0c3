//! Per-car record construction.

use std::time::Duration;

use super::context::SessionContext;
use super::pit::PitTracker;
use super::record::CarRecord;
use super::time::TimeFormatter;
use crate::session::ResultPosition;

/// Builds [`CarRecord`]s and owns the pit memory they need.
#[derive(Debug, Clone)]
pub struct CarDataBuilder {
    pit: PitTracker,
}

impl CarDataBuilder {
    pub fn new(pit_exit_window: Duration) -> Self {
        Self { pit: PitTracker::new(pit_exit_window) }
    }

    /// Record for the car in slot `idx`, `None` for pace cars and empty slots.
    pub fn build(&mut self, idx: usize, ctx: &SessionContext<'_>) -> Option<CarRecord> {
        let driver = ctx.driver(idx)?;
        if driver.is_pace_car() {
            return None;
        }

        let laps_started = ctx.laps_started(idx);
        let is_pit_road = ctx.on_pit_road(idx);

        Some(CarRecord {
            pos: resolve_position(idx, ctx),
            car_idx: idx,
            car_number: driver.car_number.clone(),
            name: driver.first_name().to_string(),
            laps_started,
            last_lap: TimeFormatter::format_lap_time(ctx.last_lap_time(idx)),
            irating: driver.i_rating,
            license: driver.lic_string.clone(),
            car_class_color: driver.class_color(),
            lap_dist_pct: ctx.lap_dist(idx).map(|dist| round_to(dist, 3)),
            is_pit_road,
            last_pit_lap: self.pit.observe(idx, laps_started, is_pit_road, ctx.captured_at),
        })
    }

    /// Forget pit history.
    pub fn reset_pit_data(&mut self) {
        self.pit.reset();
    }

    pub fn pit_tracker(&self) -> &PitTracker {
        &self.pit
    }
}

/// Running position with the grid fallback for cars not yet classified.
pub fn resolve_position(idx: usize, ctx: &SessionContext<'_>) -> Option<i32> {
    let raw = if ctx.multiclass { ctx.class_position(idx) } else { ctx.position(idx) };
    match raw.unwrap_or(0) {
        0 => Some(starting_position(idx, ctx)),
        pos if pos < 0 => None,
        pos => Some(pos),
    }
}

/// Grid slot from warmup/qualifying results, 0 when the car has none.
///
/// Session class positions are zero-based, so they get +1. Qualifying
/// results are zero-based for both fields.
pub fn starting_position(idx: usize, ctx: &SessionContext<'_>) -> i32 {
    let pick = |result: &ResultPosition| {
        if ctx.multiclass { result.class_position } else { result.position }
    };

    let from_sessions = ctx
        .sessions
        .iter()
        .filter(|session| session.is_grid_source())
        .filter_map(|session| session.result_for(idx))
        .find_map(pick)
        .map(|pos| if ctx.multiclass { pos + 1 } else { pos });

    from_sessions
        .or_else(|| {
            ctx.qualify_results
                .iter()
                .find(|result| result.car_idx.is_some_and(|car| car as i64 == idx as i64))
                .and_then(pick)
                .map(|pos| pos + 1)
        })
        .unwrap_or(0)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
