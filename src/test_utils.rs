//! In-memory telemetry for tests and benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use crate::session::{Driver, ResultPosition, Session};
use crate::telemetry::{TelemetrySnapshot, TelemetrySource};
use crate::{Result, StandingsError};

/// A [`TelemetrySnapshot`] whose every field is set directly.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFixture {
    pub player_car_idx: Option<usize>,
    pub car_idx_position: Option<Vec<i32>>,
    pub car_idx_class_position: Option<Vec<i32>>,
    pub car_idx_last_lap_time: Option<Vec<f32>>,
    pub car_idx_best_lap_time: Option<Vec<f32>>,
    pub car_idx_lap: Option<Vec<i32>>,
    pub car_idx_lap_dist_pct: Option<Vec<f32>>,
    pub car_idx_on_pit_road: Option<Vec<bool>>,
    pub session_time: Option<f64>,
    pub session_time_total: Option<f64>,
    pub session_laps_remain: Option<i32>,
    pub drivers: Vec<Driver>,
    pub sessions: Vec<Session>,
    pub current_session_num: Option<i32>,
    pub qualify_results: Vec<ResultPosition>,
}

impl SnapshotFixture {
    /// `cars` single-class cars in running order, spread evenly round the lap,
    /// all on lap 5 with the player in slot 0.
    pub fn field(cars: usize) -> Self {
        let drivers = (0..cars)
            .map(|idx| Driver {
                car_idx: Some(idx as i32),
                user_name: format!("Driver{idx} Test"),
                car_number: Some(format!("{}", idx + 1)),
                car_class_id: Some(1),
                car_class_color: Some("0xffda59".into()),
                car_class_est_lap_time: Some(80.0),
                i_rating: Some(1500 + idx as i32 * 10),
                lic_string: Some("B 3.21".into()),
                ..Default::default()
            })
            .collect();

        Self {
            player_car_idx: Some(0),
            car_idx_position: Some((1..=cars as i32).collect()),
            car_idx_class_position: Some((1..=cars as i32).collect()),
            car_idx_last_lap_time: Some(vec![80.0; cars]),
            car_idx_best_lap_time: Some(vec![-1.0; cars]),
            car_idx_lap: Some(vec![5; cars]),
            car_idx_lap_dist_pct: Some((0..cars).map(|idx| idx as f32 / cars as f32).collect()),
            car_idx_on_pit_road: Some(vec![false; cars]),
            session_time: Some(600.0),
            session_time_total: Some(1800.0),
            session_laps_remain: None,
            drivers,
            sessions: Vec::new(),
            current_session_num: Some(0),
            qualify_results: Vec::new(),
        }
    }
}

impl TelemetrySnapshot for SnapshotFixture {
    fn player_car_idx(&self) -> Option<usize> {
        self.player_car_idx
    }

    fn car_idx_position(&self) -> Option<Vec<i32>> {
        self.car_idx_position.clone()
    }

    fn car_idx_class_position(&self) -> Option<Vec<i32>> {
        self.car_idx_class_position.clone()
    }

    fn car_idx_last_lap_time(&self) -> Option<Vec<f32>> {
        self.car_idx_last_lap_time.clone()
    }

    fn car_idx_best_lap_time(&self) -> Option<Vec<f32>> {
        self.car_idx_best_lap_time.clone()
    }

    fn car_idx_lap(&self) -> Option<Vec<i32>> {
        self.car_idx_lap.clone()
    }

    fn car_idx_lap_dist_pct(&self) -> Option<Vec<f32>> {
        self.car_idx_lap_dist_pct.clone()
    }

    fn car_idx_on_pit_road(&self) -> Option<Vec<bool>> {
        self.car_idx_on_pit_road.clone()
    }

    fn session_time(&self) -> Option<f64> {
        self.session_time
    }

    fn session_time_total(&self) -> Option<f64> {
        self.session_time_total
    }

    fn session_laps_remain(&self) -> Option<i32> {
        self.session_laps_remain
    }

    fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    fn current_session_num(&self) -> Option<i32> {
        self.current_session_num
    }

    fn qualify_results(&self) -> &[ResultPosition] {
        &self.qualify_results
    }
}

/// A [`TelemetrySource`] that always hands out the same fixture.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    snapshot: Option<SnapshotFixture>,
}

impl FixtureSource {
    pub fn connected(snapshot: SnapshotFixture) -> Self {
        Self { snapshot: Some(snapshot) }
    }

    pub fn disconnected() -> Self {
        Self { snapshot: None }
    }
}

impl TelemetrySource for FixtureSource {
    type Snapshot = SnapshotFixture;

    fn ensure_connected(&mut self) -> Result<()> {
        match self.snapshot {
            Some(_) => Ok(()),
            None => Err(StandingsError::connection_failed("fixture source is disconnected")),
        }
    }

    fn snapshot(&mut self) -> Option<SnapshotFixture> {
        self.snapshot.clone()
    }
}
