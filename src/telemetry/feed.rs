//! Watch-channel telemetry source.
//!
//! Whatever reads iRacing's shared memory (or replays a recording) publishes
//! through a [`FeedSender`]; the leaderboard polls the paired [`FrameFeed`].
//! Only the latest frame and session matter, so both sides of the pipe are
//! `tokio::sync::watch` channels and slow readers simply skip frames.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use super::{FramePacket, TelemetryFrame, TelemetrySource};
use crate::session::{SessionInfo, SessionInfoParser};
use crate::{Result, StandingsError};

/// Producer half of a [`FrameFeed`].
#[derive(Debug)]
pub struct FeedSender {
    frames: watch::Sender<Option<Arc<FramePacket>>>,
    sessions: watch::Sender<Option<Arc<SessionInfo>>>,
    parser: SessionInfoParser,
    last_session_version: Option<u32>,
}

impl FeedSender {
    /// Publish a frame. Fails once every [`FrameFeed`] has been dropped.
    pub fn publish_frame(&self, packet: FramePacket) -> Result<()> {
        trace!(tick = packet.tick, session_version = packet.session_version, "Publishing frame");
        self.frames
            .send(Some(Arc::new(packet)))
            .map_err(|_| StandingsError::connection_failed("frame feed receiver dropped"))
    }

    /// Publish already-parsed session info.
    pub fn publish_session(&self, session: Arc<SessionInfo>) -> Result<()> {
        self.sessions
            .send(Some(session))
            .map_err(|_| StandingsError::connection_failed("frame feed receiver dropped"))
    }

    /// Parse and publish raw session YAML unless `version` was already published.
    pub fn publish_session_yaml(&mut self, yaml: &str, version: u32) -> Result<()> {
        if self.last_session_version == Some(version) {
            return Ok(());
        }

        let session = self.parser.parse_versioned(yaml, version)?;
        debug!(
            version,
            previous = ?self.last_session_version,
            track = %session.weekend_info.track_name,
            "Session info updated"
        );
        self.last_session_version = Some(version);
        self.publish_session(session)
    }

    /// Signal end of stream to every reader.
    pub fn close(self) {
        info!("Closing frame feed");
        let _ = self.frames.send(None);
        let _ = self.sessions.send(None);
    }
}

/// Consumer half: a [`TelemetrySource`] reading the latest published frame.
///
/// The feed counts as connected while frames keep arriving with a new tick at
/// least every `stale_after`.
#[derive(Debug)]
pub struct FrameFeed {
    frames: watch::Receiver<Option<Arc<FramePacket>>>,
    sessions: watch::Receiver<Option<Arc<SessionInfo>>>,
    stale_after: Duration,
    last_tick: Option<u32>,
    last_tick_at: Option<Instant>,
    connected: bool,
}

impl FrameFeed {
    /// Create a connected sender/feed pair.
    pub fn channel(stale_after: Duration) -> (FeedSender, FrameFeed) {
        let (frame_tx, frame_rx) = watch::channel(None);
        let (session_tx, session_rx) = watch::channel(None);

        let sender = FeedSender {
            frames: frame_tx,
            sessions: session_tx,
            parser: SessionInfoParser::new(),
            last_session_version: None,
        };
        (sender, Self::from_receivers(frame_rx, session_rx, stale_after))
    }

    /// Wrap existing watch receivers, e.g. ones fed by another reader task.
    pub fn from_receivers(
        frames: watch::Receiver<Option<Arc<FramePacket>>>,
        sessions: watch::Receiver<Option<Arc<SessionInfo>>>,
        stale_after: Duration,
    ) -> Self {
        Self { frames, sessions, stale_after, last_tick: None, last_tick_at: None, connected: false }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn check(&mut self) -> Result<()> {
        if self.frames.has_changed().is_err() {
            return Err(StandingsError::connection_failed("frame feed closed"));
        }

        let Some(tick) = self.frames.borrow().as_ref().map(|packet| packet.tick) else {
            return Err(StandingsError::connection_failed("no telemetry frames received"));
        };

        let now = Instant::now();
        if self.last_tick != Some(tick) {
            self.last_tick = Some(tick);
            self.last_tick_at = Some(now);
        }

        let idle = self.last_tick_at.map_or(Duration::ZERO, |at| now.duration_since(at));
        if idle > self.stale_after {
            return Err(StandingsError::connection_failed(format!(
                "telemetry stalled at tick {} for {:.1}s",
                tick,
                idle.as_secs_f64()
            )));
        }

        Ok(())
    }
}

impl TelemetrySource for FrameFeed {
    type Snapshot = TelemetryFrame;

    fn ensure_connected(&mut self) -> Result<()> {
        let result = self.check();
        match (&result, self.connected) {
            (Ok(()), false) => info!(tick = ?self.last_tick, "Telemetry feed connected"),
            (Err(e), true) => warn!("Telemetry feed lost: {}", e),
            _ => {}
        }
        self.connected = result.is_ok();
        result
    }

    fn snapshot(&mut self) -> Option<TelemetryFrame> {
        let packet = self.frames.borrow_and_update().clone()?;
        let session = self.sessions.borrow_and_update().clone();
        Some(TelemetryFrame::new(packet, session))
    }
}
