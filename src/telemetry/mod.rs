//! Telemetry capability interface.
//!
//! The leaderboard core compiles against [`TelemetrySnapshot`], a narrow set of
//! typed accessors for exactly the variables it reads, rather than a generic
//! by-name bag. [`TelemetrySource`] adds the connect/reconnect lifecycle around
//! obtaining snapshots.
//!
//! Two implementations ship with the crate:
//! - [`TelemetryFrame`]: a raw iRacing frame buffer decoded through a
//!   [`VariableSchema`], paired with the parsed session YAML
//! - [`FrameFeed`]: a [`TelemetrySource`] over watch channels of frames and
//!   session info

use crate::Result;
use crate::session::{Driver, ResultPosition, Session, find_session};

mod feed;
mod frame;

pub use feed::{FeedSender, FrameFeed};
pub use frame::{FramePacket, TelemetryFrame, VarData, VariableInfo, VariableSchema, VariableType};

/// iRacing telemetry variable names read by the leaderboard.
pub mod vars {
    pub const PLAYER_CAR_IDX: &str = "PlayerCarIdx";
    pub const CAR_IDX_POSITION: &str = "CarIdxPosition";
    pub const CAR_IDX_CLASS_POSITION: &str = "CarIdxClassPosition";
    pub const CAR_IDX_LAST_LAP_TIME: &str = "CarIdxLastLapTime";
    pub const CAR_IDX_BEST_LAP_TIME: &str = "CarIdxBestLapTime";
    pub const CAR_IDX_LAP: &str = "CarIdxLap";
    pub const CAR_IDX_LAP_DIST_PCT: &str = "CarIdxLapDistPct";
    pub const CAR_IDX_ON_PIT_ROAD: &str = "CarIdxOnPitRoad";
    pub const SESSION_TIME: &str = "SessionTime";
    pub const SESSION_TIME_TOTAL: &str = "SessionTimeTotal";
    pub const SESSION_LAPS_REMAIN_EX: &str = "SessionLapsRemainEx";
}

/// Read-only view of one telemetry tick.
///
/// Per-car arrays are indexed by car slot. Every accessor returns `None` (or an
/// empty slice) when the value is absent; implementations never panic on
/// missing or malformed data.
pub trait TelemetrySnapshot {
    /// Local player's car index
    fn player_car_idx(&self) -> Option<usize>;

    /// Overall running order per car (0 = not yet classified, -1 = not applicable)
    fn car_idx_position(&self) -> Option<Vec<i32>>;

    /// Class running order per car
    fn car_idx_class_position(&self) -> Option<Vec<i32>>;

    /// Last lap time per car in seconds (non-positive = none yet)
    fn car_idx_last_lap_time(&self) -> Option<Vec<f32>>;

    /// Best lap time per car in seconds
    fn car_idx_best_lap_time(&self) -> Option<Vec<f32>>;

    /// Laps started per car (-1 before the first lap)
    fn car_idx_lap(&self) -> Option<Vec<i32>>;

    /// Fractional lap progress per car (negative = unknown)
    fn car_idx_lap_dist_pct(&self) -> Option<Vec<f32>>;

    /// Pit road flag per car
    fn car_idx_on_pit_road(&self) -> Option<Vec<bool>>;

    /// Elapsed session time in seconds
    fn session_time(&self) -> Option<f64>;

    /// Total session duration in seconds
    fn session_time_total(&self) -> Option<f64>;

    /// Laps remaining for the leader
    fn session_laps_remain(&self) -> Option<i32>;

    /// Driver roster from the session YAML
    fn drivers(&self) -> &[Driver];

    /// Session list from the session YAML
    fn sessions(&self) -> &[Session];

    /// Currently running session number
    fn current_session_num(&self) -> Option<i32>;

    /// Qualifying results carried into later sessions
    fn qualify_results(&self) -> &[ResultPosition];

    /// The currently running session record.
    fn current_session(&self) -> Option<&Session> {
        find_session(self.sessions(), self.current_session_num()?)
    }
}

/// A telemetry source with a connect/reconnect lifecycle.
pub trait TelemetrySource {
    type Snapshot: TelemetrySnapshot;

    /// Re-assert the connection, reconnecting if the source went away.
    ///
    /// Returns an error while no usable telemetry is available.
    fn ensure_connected(&mut self) -> Result<()>;

    /// The most recent snapshot, if any.
    fn snapshot(&mut self) -> Option<Self::Snapshot>;
}
