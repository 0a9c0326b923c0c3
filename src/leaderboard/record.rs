//! Output records. Field names are part of the overlay contract.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::Result;

/// One car's leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CarRecord {
    /// Resolved running position, `None` when not applicable
    pub pos: Option<i32>,
    pub car_idx: usize,
    pub car_number: Option<String>,
    /// First name only
    pub name: String,
    pub laps_started: i32,
    /// Formatted last lap (`MM:SS.mmm`)
    pub last_lap: String,
    pub irating: Option<i32>,
    pub license: Option<String>,
    /// Class color as `#rrggbb`
    pub car_class_color: Option<String>,
    /// Lap progress rounded to 3 decimals
    pub lap_dist_pct: Option<f64>,
    pub is_pit_road: bool,
    /// `IN L{n}`, `OUT L{n}` or `L{n}` once the car has pitted this session
    pub last_pit_lap: Option<String>,
}

/// Lap count of a neighbor relative to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum LapStatus {
    AheadLap,
    BehindLap,
}

/// A car near the player on track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct NeighborRecord {
    #[serde(flatten)]
    pub car: CarRecord,
    pub lap_status: Option<LapStatus>,
    /// Absolute lap-fraction gap, 3 decimals
    pub gap_pct: f64,
    /// Absolute estimated gap in seconds, 2 decimals
    pub gap_sec: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Neighbors {
    /// Closest first
    pub ahead: Vec<NeighborRecord>,
    /// Closest first
    pub behind: Vec<NeighborRecord>,
}

/// Session block of a populated snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LeaderboardData {
    /// Lap limit of the current session, `None` when unlimited
    pub session_laps: Option<i32>,
    /// Player lap-time estimate in seconds
    pub player_lap_time: Option<f64>,
    /// Session length estimate in seconds
    pub session_time: Option<f64>,
    /// Session length estimate, `~`-prefixed when derived from laps
    pub session_time_formatted: String,
    /// Live session clock
    pub session_time_current: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Waiting,
}

/// Everything an overlay renders for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LeaderboardSnapshot {
    /// Present only on the waiting shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SnapshotStatus>,
    /// Sorted field, player excluded
    pub cars: Vec<CarRecord>,
    pub player: Option<CarRecord>,
    pub neighbors: Neighbors,
    pub leaderboard_data: Option<LeaderboardData>,
    pub multiclass: bool,
    /// Unix seconds
    pub timestamp: u64,
}

impl LeaderboardSnapshot {
    /// The shape returned while no driver data is available.
    pub fn waiting() -> Self {
        Self {
            status: Some(SnapshotStatus::Waiting),
            cars: Vec::new(),
            player: None,
            neighbors: Neighbors::default(),
            leaderboard_data: None,
            multiclass: false,
            timestamp: unix_timestamp(),
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == Some(SnapshotStatus::Waiting)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub(crate) fn unix_timestamp() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_secs()).unwrap_or(0)
}
