//! Lap and session time formatting and estimation.

use crate::session::UNLIMITED_LAPS;

use super::context::SessionContext;

/// Shown for any time that is missing or not yet valid.
pub const PLACEHOLDER: &str = "--:--.---";

/// How a session duration is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionClock {
    /// `HH:MM:SSh` from one hour, `MM:SSm` below
    Seconds,
    /// `HH:MMh` from one hour, `MM:SSm` below
    Duration,
}

pub struct TimeFormatter;

impl TimeFormatter {
    /// `MM:SS.mmm`, milliseconds truncated.
    pub fn format_lap_time(seconds: Option<f64>) -> String {
        let Some(seconds) = seconds.filter(|s| s.is_finite() && *s > 0.0) else {
            return PLACEHOLDER.to_string();
        };

        let millis = (seconds * 1000.0) as u64;
        let secs = millis / 1000;
        format!("{:02}:{:02}.{:03}", secs / 60, secs % 60, millis % 1000)
    }

    pub fn format_session_time(seconds: Option<f64>, clock: SessionClock) -> String {
        let Some(seconds) = seconds.filter(|s| s.is_finite() && *s >= 0.0) else {
            return PLACEHOLDER.to_string();
        };

        let total = seconds as u64;
        let (hours, minutes, secs) = (total / 3600, total % 3600 / 60, total % 60);
        match clock {
            _ if hours == 0 => format!("{:02}:{:02}m", minutes, secs),
            SessionClock::Seconds => format!("{:02}:{:02}:{:02}h", hours, minutes, secs),
            SessionClock::Duration => format!("{:02}:{:02}h", hours, minutes),
        }
    }
}

/// Length of the current session as far as it can be told.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionTimeEstimate {
    pub seconds: Option<f64>,
    /// Derived from a lap count and a lap-time estimate
    pub approximate: bool,
}

impl SessionTimeEstimate {
    pub fn formatted(&self) -> String {
        let text = TimeFormatter::format_session_time(self.seconds, SessionClock::Duration);
        if self.approximate && self.seconds.is_some() {
            format!("~{text}")
        } else {
            text
        }
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Best lap of a car, from telemetry or else the current session's results.
pub fn best_lap_time(ctx: &SessionContext<'_>, car_idx: usize) -> Option<f64> {
    if ctx.best_lap_times.is_some() {
        return positive(ctx.best_lap_time(car_idx));
    }
    positive(ctx.current_session.and_then(|session| session.fastest_time_for(car_idx)))
}

/// Class-level lap estimate published in the roster.
pub fn estimated_lap_time(ctx: &SessionContext<'_>, car_idx: usize) -> Option<f64> {
    positive(ctx.driver(car_idx).and_then(|driver| driver.car_class_est_lap_time))
}

/// Lap time used to turn gaps and lap counts into seconds.
pub fn car_lap_time(ctx: &SessionContext<'_>, car_idx: usize) -> Option<f64> {
    best_lap_time(ctx, car_idx).or_else(|| estimated_lap_time(ctx, car_idx))
}

/// Session length: laps times `lap_time` for lap-limited races, the reported duration otherwise.
pub fn session_time(ctx: &SessionContext<'_>, lap_time: Option<f64>) -> SessionTimeEstimate {
    let session = ctx.current_session;

    if let Some(limit) = session.filter(|s| s.is_race()).and_then(|s| s.lap_limit()) {
        let laps = ctx.session_laps_remain.filter(|laps| (0..UNLIMITED_LAPS).contains(laps)).unwrap_or(limit);
        return SessionTimeEstimate { seconds: lap_time.map(|t| f64::from(laps) * t), approximate: true };
    }

    let seconds = positive(ctx.session_time_total).or_else(|| session.and_then(|s| s.time_limit_secs()));
    SessionTimeEstimate { seconds, approximate: false }
}
