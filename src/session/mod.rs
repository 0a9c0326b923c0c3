//! # Session Information Model
//!
//! Typed view over the subset of iRacing's session YAML the leaderboard reads:
//! the driver roster, the session list with its results, and the qualifying
//! results block. Unknown keys are ignored and every field is defaulted, so a
//! partial document still deserializes.
//!
//! ```text
//! WeekendInfo:
//!   TrackName: watkinsglen 2021 fullcourse
//! SessionInfo:
//!   CurrentSessionNum: 2
//!   Sessions:
//!   - SessionNum: 0
//!     SessionType: Lone Qualify
//!     ResultsPositions:
//!     - CarIdx: 3
//!       Position: 1
//!       ClassPosition: 0
//! DriverInfo:
//!   DriverCarIdx: 3
//!   Drivers:
//!   - CarIdx: 0
//!     UserName: Pace Car
//! ```

use serde::{Deserialize, Serialize};

pub mod parser;

pub use parser::{SessionInfoCache, SessionInfoParser};

/// SessionLaps / SessionLapsTotal value iRacing uses for "no lap limit".
pub const UNLIMITED_LAPS: i32 = 32767;

/// Session information extracted from iRacing's YAML session data
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionInfo {
    /// Weekend and track information
    pub weekend_info: WeekendInfo,
    /// Session list and current session number
    pub session_info: SessionInfoData,
    /// Driver roster
    pub driver_info: Option<DriverInfoData>,
    /// Qualifying results carried into race sessions
    pub qualify_results_info: Option<QualifyResultsInfo>,
}

impl SessionInfo {
    /// Deserialize already-cleaned YAML.
    pub fn parse(yaml: &str) -> crate::Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| crate::StandingsError::Parse {
            context: "SessionInfo deserialization".to_string(),
            details: e.to_string(),
        })
    }

    /// Drivers list, empty when the roster has not been published yet.
    pub fn drivers(&self) -> &[Driver] {
        self.driver_info.as_ref().and_then(|info| info.drivers.as_deref()).unwrap_or(&[])
    }

    /// The session currently running, looked up by `SessionNum` and then by position.
    pub fn current_session(&self) -> Option<&Session> {
        find_session(&self.session_info.sessions, self.session_info.current_session_num)
    }

    /// Qualifying results, empty when absent.
    pub fn qualify_results(&self) -> &[ResultPosition] {
        self.qualify_results_info.as_ref().and_then(|info| info.results.as_deref()).unwrap_or(&[])
    }
}

/// Track information
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct WeekendInfo {
    /// Internal track name
    pub track_name: String,
    /// Track display name
    pub track_display_name: String,
    /// Track length ("5.43 km")
    pub track_length: String,
}

/// Session list
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionInfoData {
    /// Current session number
    pub current_session_num: i32,
    /// List of sessions
    pub sessions: Vec<Session>,
}

/// Individual session data
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Session {
    /// Session number
    pub session_num: i32,
    /// Session laps ("unlimited" or number)
    pub session_laps: String,
    /// Session time ("unlimited" or "<secs> sec")
    pub session_time: String,
    /// Session type ("Practice", "Lone Qualify", "Race", ...)
    pub session_type: String,
    /// Session name
    pub session_name: Option<String>,
    /// Results positions
    pub results_positions: Option<Vec<ResultPosition>>,
    /// Results fastest lap data
    pub results_fastest_lap: Option<Vec<FastestLap>>,
}

impl Session {
    /// Lap limit of this session, `None` for unlimited or unparsable values.
    pub fn lap_limit(&self) -> Option<i32> {
        let laps: i32 = self.session_laps.trim().parse().ok()?;
        (laps > 0 && laps != UNLIMITED_LAPS).then_some(laps)
    }

    /// Time limit of this session in seconds, `None` for unlimited.
    pub fn time_limit_secs(&self) -> Option<f64> {
        let value = self.session_time.trim();
        let number = value.strip_suffix("sec").unwrap_or(value).trim();
        let secs: f64 = number.parse().ok()?;
        (secs.is_finite() && secs > 0.0).then_some(secs)
    }

    pub fn is_race(&self) -> bool {
        normalized_type(&self.session_type) == "race"
    }

    /// Whether this session's results seed the race grid.
    pub fn is_grid_source(&self) -> bool {
        matches!(normalized_type(&self.session_type).as_str(), "warmup" | "lonequalify" | "openqualify")
    }

    /// Results entry for a car, if the car is classified in this session.
    pub fn result_for(&self, car_idx: usize) -> Option<&ResultPosition> {
        self.results_positions.as_deref()?.iter().find(|result| result.is_car(car_idx))
    }

    /// Fastest lap time recorded for a car in this session.
    pub fn fastest_time_for(&self, car_idx: usize) -> Option<f64> {
        self.results_fastest_lap
            .as_deref()?
            .iter()
            .find(|lap| lap.car_idx.is_some_and(|idx| idx as i64 == car_idx as i64))
            .and_then(|lap| lap.fastest_time)
    }
}

/// Look a session up by `SessionNum`, falling back to its position in the list.
pub fn find_session(sessions: &[Session], num: i32) -> Option<&Session> {
    sessions
        .iter()
        .find(|session| session.session_num == num)
        .or_else(|| usize::try_from(num).ok().and_then(|idx| sessions.get(idx)))
}

fn normalized_type(session_type: &str) -> String {
    session_type
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One classified car in a session's results
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct ResultPosition {
    /// Overall position (1-based)
    pub position: Option<i32>,
    /// Class position (0-based)
    pub class_position: Option<i32>,
    /// Car index
    pub car_idx: Option<i32>,
    /// Lap count
    pub lap: Option<i32>,
    /// Fastest lap time
    pub fastest_time: Option<f64>,
    /// Last lap time
    pub last_time: Option<f64>,
}

impl ResultPosition {
    fn is_car(&self, car_idx: usize) -> bool {
        self.car_idx.is_some_and(|idx| idx as i64 == car_idx as i64)
    }
}

/// Fastest lap entry
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct FastestLap {
    pub car_idx: Option<i32>,
    pub fastest_lap: Option<i32>,
    pub fastest_time: Option<f64>,
}

/// Qualifying results information
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct QualifyResultsInfo {
    /// List of qualifying results
    pub results: Option<Vec<ResultPosition>>,
}

/// Driver information: local driver + roster
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct DriverInfoData {
    /// Local player's car index
    pub driver_car_idx: Option<i32>,
    /// Pace car index
    pub pace_car_idx: Option<i32>,
    /// List of all drivers in session
    pub drivers: Option<Vec<Driver>>,
}

/// Individual driver data (from Drivers list)
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Driver {
    /// Car slot; absent entries take their position in the roster
    pub car_idx: Option<i32>,
    /// Driver name
    pub user_name: String,
    /// Car number (display)
    pub car_number: Option<String>,
    /// Car class ID
    #[serde(rename = "CarClassID")]
    pub car_class_id: Option<i32>,
    /// Car class color (hex, "0xffda59")
    pub car_class_color: Option<String>,
    /// Car class estimated lap time
    pub car_class_est_lap_time: Option<f64>,
    /// Whether this is a pace car
    pub car_is_pace_car: Option<i32>,
    /// iRating
    pub i_rating: Option<i32>,
    /// License string (display)
    pub lic_string: Option<String>,
    /// Whether this is a spectator
    pub is_spectator: Option<i32>,
}

impl Driver {
    /// Pace car entries are excluded from every ranking.
    pub fn is_pace_car(&self) -> bool {
        self.user_name.trim().eq_ignore_ascii_case("PACE CAR") || self.car_is_pace_car == Some(1)
    }

    /// First word of the display name.
    pub fn first_name(&self) -> &str {
        self.user_name.split_whitespace().next().unwrap_or("")
    }

    /// Class color as `#rrggbb`.
    pub fn class_color(&self) -> Option<String> {
        self.car_class_color.as_deref().and_then(normalize_color)
    }
}

/// Normalize iRacing color strings (`0xffda59`, `ffda59`, `#ffda59`) to `#rrggbb`.
pub fn normalize_color(value: &str) -> Option<String> {
    let value = value.trim();
    let hex = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .or_else(|| value.strip_prefix('#'))
        .unwrap_or(value);

    if hex.is_empty() || hex.len() > 6 {
        return None;
    }
    let rgb = u32::from_str_radix(hex, 16).ok()?;
    Some(format!("#{:06x}", rgb))
}
