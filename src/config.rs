//! Leaderboard configuration and polling cadence.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Result, StandingsError};

/// Nominal tick rate of the iRacing telemetry feed.
pub const NATIVE_HZ: f64 = 60.0;

const DEFAULT_PIT_EXIT_WINDOW: f64 = 5.0;
const DEFAULT_STALE_AFTER: f64 = 2.0;

/// Polling rate for snapshot computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum UpdateRate {
    /// Poll once per telemetry tick
    Native,

    /// Poll at most this many times per second
    /// If the requested rate exceeds the telemetry rate, Native is used
    Max(u32),
}

impl Default for UpdateRate {
    fn default() -> Self {
        UpdateRate::Max(4)
    }
}

impl UpdateRate {
    /// Normalize rate against source frequency
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(hz) if hz as f64 >= source_hz => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Interval between two polls.
    pub fn poll_interval(self) -> Duration {
        match self.normalize(NATIVE_HZ) {
            UpdateRate::Native => Duration::from_secs_f64(1.0 / NATIVE_HZ),
            UpdateRate::Max(hz) => Duration::from_secs_f64(1.0 / hz.max(1) as f64),
        }
    }
}

/// Tunables for the leaderboard core and the polling service.
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Seconds a car keeps its `OUT L{n}` label after leaving pit road
    pub pit_exit_window: f64,
    /// Maximum entries in each of the ahead/behind neighbor lists
    pub neighbor_limit: usize,
    /// Polling cadence of [`crate::LeaderboardService`]
    pub update_rate: UpdateRate,
    /// Seconds without a new telemetry tick before the feed counts as disconnected
    pub stale_after: f64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            pit_exit_window: DEFAULT_PIT_EXIT_WINDOW,
            neighbor_limit: 3,
            update_rate: UpdateRate::default(),
            stale_after: DEFAULT_STALE_AFTER,
        }
    }
}

impl LeaderboardConfig {
    /// Parse and validate a YAML configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml).map_err(|e| {
                StandingsError::parse_error("Leaderboard config", e.to_string())
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.pit_exit_window.is_finite() || self.pit_exit_window < 0.0 {
            return Err(StandingsError::invalid_config(format!(
                "pit_exit_window must be a non-negative number of seconds, got {}",
                self.pit_exit_window
            )));
        }

        if self.neighbor_limit == 0 {
            return Err(StandingsError::invalid_config("neighbor_limit must be at least 1"));
        }

        if !self.stale_after.is_finite() || self.stale_after <= 0.0 {
            return Err(StandingsError::invalid_config(format!(
                "stale_after must be a positive number of seconds, got {}",
                self.stale_after
            )));
        }

        if self.update_rate == UpdateRate::Max(0) {
            return Err(StandingsError::invalid_config("update_rate Max(0) never polls"));
        }

        Ok(())
    }

    /// Exit window as a [`Duration`]; out-of-range values fall back to the default.
    pub fn pit_exit_duration(&self) -> Duration {
        seconds_or(self.pit_exit_window, DEFAULT_PIT_EXIT_WINDOW)
    }

    /// Stale window as a [`Duration`]; out-of-range values fall back to the default.
    pub fn stale_duration(&self) -> Duration {
        seconds_or(self.stale_after, DEFAULT_STALE_AFTER)
    }
}

fn seconds_or(seconds: f64, default: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or_else(|_| Duration::from_secs_f64(default))
}
