//! # Leaderboard
//!
//! Reduces one telemetry snapshot to a driver-centric [`LeaderboardSnapshot`]:
//!
//! ```text
//! TelemetrySnapshot ─▶ SessionContext ─▶ CarDataBuilder × N ─┬─▶ CarSorter ──────┐
//!                                                            └─▶ NeighborsService ┴─▶ LeaderboardSnapshot
//! ```
//!
//! The only state kept between calls is the pit memory inside
//! [`CarDataBuilder`], cleared whenever the session number changes. Nothing in
//! here fails: missing or malformed telemetry degrades to absent fields, and
//! an empty roster produces [`LeaderboardSnapshot::waiting`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::config::LeaderboardConfig;
use crate::telemetry::{TelemetrySnapshot, TelemetrySource};

mod builder;
mod context;
mod neighbors;
mod pit;
mod record;
mod sorter;
mod time;

pub use builder::{CarDataBuilder, resolve_position, starting_position};
pub use context::{MAX_CAR_SLOTS, SessionContext, is_multiclass};
pub use neighbors::{NeighborsService, circular_gap};
pub use pit::PitTracker;
pub use record::{CarRecord, LapStatus, LeaderboardData, LeaderboardSnapshot, NeighborRecord, Neighbors, SnapshotStatus};
pub use sorter::CarSorter;
pub use time::{PLACEHOLDER, SessionClock, SessionTimeEstimate, TimeFormatter, car_lap_time, session_time};

/// Snapshot orchestrator.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    builder: CarDataBuilder,
    neighbors: NeighborsService,
    last_session_num: Option<i32>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(&LeaderboardConfig::default())
    }
}

impl Leaderboard {
    /// Invalid durations in `config` fall back to their defaults.
    pub fn new(config: &LeaderboardConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("Leaderboard config rejected, using defaults where needed: {}", e);
        }

        Self {
            builder: CarDataBuilder::new(config.pit_exit_duration()),
            neighbors: NeighborsService::new(config.neighbor_limit),
            last_session_num: None,
        }
    }

    /// Re-assert the source connection and compute from its latest snapshot.
    pub fn poll<S: TelemetrySource>(&mut self, source: &mut S) -> LeaderboardSnapshot {
        if let Err(e) = source.ensure_connected() {
            trace!("Telemetry unavailable: {}", e);
            return LeaderboardSnapshot::waiting();
        }

        match source.snapshot() {
            Some(telemetry) => self.snapshot(&telemetry),
            None => LeaderboardSnapshot::waiting(),
        }
    }

    pub fn snapshot(&mut self, telemetry: &impl TelemetrySnapshot) -> LeaderboardSnapshot {
        self.snapshot_at(telemetry, Instant::now())
    }

    /// Compute with an explicit clock reading for the pit exit window.
    pub fn snapshot_at(&mut self, telemetry: &impl TelemetrySnapshot, captured_at: Instant) -> LeaderboardSnapshot {
        let Some(ctx) = SessionContext::assemble(telemetry, captured_at) else {
            trace!("No driver data yet");
            return LeaderboardSnapshot::waiting();
        };

        self.detect_session_change(ctx.current_session_num);

        let player_idx = ctx.player_idx;
        let mut cars: Vec<CarRecord> = ctx
            .car_indices()
            .filter(|&idx| Some(idx) != player_idx)
            .filter_map(|idx| self.builder.build(idx, &ctx))
            .collect();
        CarSorter::sort(&mut cars);

        let player = player_idx.and_then(|idx| self.builder.build(idx, &ctx));
        let player_lap_time = player_idx.and_then(|idx| car_lap_time(&ctx, idx));
        let neighbors = match player_idx {
            Some(idx) => self.neighbors.get_neighbors(idx, &ctx, &mut self.builder, class_lap_time(&ctx, idx)),
            None => Neighbors::default(),
        };

        let estimate = session_time(&ctx, player_lap_time);
        let leaderboard_data = LeaderboardData {
            session_laps: ctx.current_session.and_then(|session| session.lap_limit()),
            player_lap_time,
            session_time: estimate.seconds,
            session_time_formatted: estimate.formatted(),
            session_time_current: TimeFormatter::format_session_time(ctx.session_time, SessionClock::Seconds),
        };

        trace!(
            cars = cars.len(),
            ahead = neighbors.ahead.len(),
            behind = neighbors.behind.len(),
            multiclass = ctx.multiclass,
            "Leaderboard snapshot computed"
        );

        LeaderboardSnapshot {
            status: None,
            cars,
            player,
            neighbors,
            leaderboard_data: Some(leaderboard_data),
            multiclass: ctx.multiclass,
            timestamp: record::unix_timestamp(),
        }
    }

    fn detect_session_change(&mut self, session_num: Option<i32>) {
        if self.last_session_num == session_num {
            return;
        }

        debug!(
            previous = ?self.last_session_num,
            current = ?session_num,
            tracked_cars = self.builder.pit_tracker().tracked_cars(),
            "Session changed, clearing pit memory"
        );
        self.builder.reset_pit_data();
        self.last_session_num = session_num;
    }
}

/// Class-level lap estimate for gap seconds, falling back to the player's own lap time.
fn class_lap_time(ctx: &SessionContext<'_>, idx: usize) -> Option<f64> {
    time::estimated_lap_time(ctx, idx).or_else(|| car_lap_time(ctx, idx))
}

/// A [`Leaderboard`] shared between request handlers.
#[derive(Debug, Clone, Default)]
pub struct SharedLeaderboard {
    inner: Arc<Mutex<Leaderboard>>,
}

impl SharedLeaderboard {
    pub fn new(leaderboard: Leaderboard) -> Self {
        Self { inner: Arc::new(Mutex::new(leaderboard)) }
    }

    pub fn snapshot(&self, telemetry: &impl TelemetrySnapshot) -> LeaderboardSnapshot {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).snapshot(telemetry)
    }

    pub fn poll<S: TelemetrySource>(&self, source: &mut S) -> LeaderboardSnapshot {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).poll(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ResultPosition, Session};
    use crate::test_utils::SnapshotFixture;
    use std::time::Duration;

    fn leaderboard() -> Leaderboard {
        let _ = tracing_subscriber::fmt::try_init();
        Leaderboard::default()
    }

    #[test]
    fn empty_roster_is_waiting() {
        let snapshot = leaderboard().snapshot(&SnapshotFixture::default());
        assert!(snapshot.is_waiting());
        assert!(snapshot.cars.is_empty());
        assert!(snapshot.player.is_none());
        assert!(snapshot.leaderboard_data.is_none());
        assert!(!snapshot.multiclass);
    }

    #[test]
    fn field_is_sorted_and_excludes_player_and_pace_car() {
        let mut fixture = SnapshotFixture::field(5);
        fixture.drivers[4].user_name = "Pace Car".into();
        fixture.car_idx_position = Some(vec![2, 4, 1, 3, 0]);
        fixture.player_car_idx = Some(0);

        let snapshot = leaderboard().snapshot(&fixture);
        assert_eq!(snapshot.status, None);
        assert_eq!(snapshot.cars.iter().map(|c| c.car_idx).collect::<Vec<_>>(), vec![2, 3, 1]);
        assert_eq!(snapshot.player.as_ref().map(|p| p.pos), Some(Some(2)));
        let in_neighbors = snapshot.neighbors.ahead.iter().chain(&snapshot.neighbors.behind);
        assert!(in_neighbors.map(|n| n.car.car_idx).all(|idx| idx != 0 && idx != 4));
    }

    #[test]
    fn session_block_uses_player_lap_time() {
        let mut fixture = SnapshotFixture::field(3);
        fixture.car_idx_best_lap_time = Some(vec![11.1, 22.2, 0.0]);
        fixture.sessions = vec![Session { session_type: "Race".into(), session_laps: "10".into(), ..Default::default() }];
        fixture.session_time = Some(3665.0);

        let snapshot = leaderboard().snapshot(&fixture);
        let data = snapshot.leaderboard_data.unwrap();
        assert_eq!(data.session_laps, Some(10));
        assert_eq!(data.player_lap_time, Some(11.1f32 as f64));
        assert!(data.session_time_formatted.starts_with('~'));
        assert_eq!(data.session_time_current, "01:01:05h");
    }

    #[test]
    fn multiclass_flag_is_reported() {
        let mut fixture = SnapshotFixture::field(2);
        fixture.drivers[1].car_class_id = Some(77);
        assert!(leaderboard().snapshot(&fixture).multiclass);
    }

    #[test]
    fn session_change_clears_pit_memory() {
        let mut fixture = SnapshotFixture::field(2);
        fixture.car_idx_on_pit_road = Some(vec![false, true]);
        let mut board = leaderboard();
        let start = Instant::now();

        let snapshot = board.snapshot_at(&fixture, start);
        assert_eq!(snapshot.cars[0].last_pit_lap.as_deref(), Some("IN L5"));

        fixture.car_idx_on_pit_road = Some(vec![false, false]);
        let snapshot = board.snapshot_at(&fixture, start + Duration::from_secs(1));
        assert_eq!(snapshot.cars[0].last_pit_lap.as_deref(), Some("OUT L5"));

        fixture.current_session_num = Some(1);
        let snapshot = board.snapshot_at(&fixture, start + Duration::from_secs(2));
        assert_eq!(snapshot.cars[0].last_pit_lap, None);
    }

    #[test]
    fn same_session_keeps_pit_memory() {
        let mut fixture = SnapshotFixture::field(2);
        fixture.car_idx_on_pit_road = Some(vec![false, true]);
        let mut board = leaderboard();
        let start = Instant::now();

        board.snapshot_at(&fixture, start);
        fixture.car_idx_on_pit_road = Some(vec![false, false]);
        let snapshot = board.snapshot_at(&fixture, start + Duration::from_secs(10));
        assert_eq!(snapshot.cars[0].last_pit_lap.as_deref(), Some("L5"));
    }

    #[test]
    fn missing_player_still_lists_field() {
        let mut fixture = SnapshotFixture::field(3);
        fixture.player_car_idx = None;

        let snapshot = leaderboard().snapshot(&fixture);
        assert_eq!(snapshot.cars.len(), 3);
        assert!(snapshot.player.is_none());
        assert!(snapshot.neighbors.ahead.is_empty() && snapshot.neighbors.behind.is_empty());
        assert_eq!(snapshot.leaderboard_data.and_then(|d| d.player_lap_time), None);
    }

    #[test]
    fn grid_fallback_applies_before_green_flag() {
        let mut fixture = SnapshotFixture::field(3);
        fixture.car_idx_position = Some(vec![0, 0, 0]);
        fixture.qualify_results = (0..3)
            .map(|car| ResultPosition { car_idx: Some(car), position: Some(2 - car), ..Default::default() })
            .collect();

        let snapshot = leaderboard().snapshot(&fixture);
        assert_eq!(snapshot.player.and_then(|p| p.pos), Some(3));
        assert_eq!(snapshot.cars.iter().map(|c| (c.car_idx, c.pos)).collect::<Vec<_>>(), vec![(2, Some(1)), (1, Some(2))]);
    }

    #[test]
    fn invalid_exit_window_uses_default() {
        let config = LeaderboardConfig { pit_exit_window: -1.0, ..Default::default() };
        let mut board = Leaderboard::new(&config);
        let mut fixture = SnapshotFixture::field(2);
        fixture.car_idx_on_pit_road = Some(vec![false, true]);
        let start = Instant::now();

        board.snapshot_at(&fixture, start);
        fixture.car_idx_on_pit_road = Some(vec![false, false]);
        board.snapshot_at(&fixture, start + Duration::from_secs(1));
        let snapshot = board.snapshot_at(&fixture, start + Duration::from_secs(4));
        assert_eq!(snapshot.cars[0].last_pit_lap.as_deref(), Some("OUT L5"));
    }

    #[test]
    fn shared_leaderboard_serializes_access() {
        let shared = SharedLeaderboard::default();
        let fixture = SnapshotFixture::field(4);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let fixture = fixture.clone();
                std::thread::spawn(move || shared.snapshot(&fixture).cars.len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 3);
        }
    }
}
