//! Driver-centric iRacing leaderboard from raw telemetry.
//!
//! Pitwall Standings turns one telemetry tick (flat per-car-slot arrays plus
//! the session YAML) into the view a broadcast or driver overlay renders:
//! the sorted field, the player's own row, the cars closest on track, pit
//! status and session time estimates.
//!
//! # Features
//!
//! - **Typed telemetry contract**: the core reads a narrow [`TelemetrySnapshot`]
//!   trait, never a dynamic field map
//! - **Frame decoding**: [`TelemetryFrame`] reads iRacing's variable buffer
//!   through a [`VariableSchema`]
//! - **Soft failure**: missing or malformed telemetry degrades to absent
//!   fields, an empty roster yields a `waiting` snapshot
//! - **Polling service**: [`LeaderboardService`] computes snapshots on a tokio
//!   task and publishes them over a watch channel
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use futures::StreamExt;
//! use pitwall_standings::{FrameFeed, LeaderboardConfig, LeaderboardService};
//!
//! #[tokio::main]
//! async fn main() -> pitwall_standings::Result<()> {
//!     let config = LeaderboardConfig::from_yaml("neighbor_limit: 2")?;
//!     let (_sender, feed) = FrameFeed::channel(config.stale_duration());
//!
//!     // A shared-memory reader publishes through the sender:
//!     // _sender.publish_session_yaml(&yaml, version)?;
//!     // _sender.publish_frame(packet)?;
//!
//!     let service = LeaderboardService::spawn(feed, config)?;
//!     let mut snapshots = service.snapshots();
//!     while let Some(snapshot) = snapshots.next().await {
//!         println!("{}", snapshot.to_json()?);
//!         tokio::time::sleep(Duration::from_secs(1)).await;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
pub mod leaderboard;
pub mod service;
pub mod session;
pub mod telemetry;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

pub use config::{LeaderboardConfig, UpdateRate};
pub use error::*;
pub use leaderboard::{
    CarRecord, LapStatus, Leaderboard, LeaderboardData, LeaderboardSnapshot, NeighborRecord, Neighbors,
    SharedLeaderboard, TimeFormatter,
};
pub use service::LeaderboardService;
pub use session::{Driver, Session, SessionInfo, SessionInfoParser};
pub use telemetry::{
    FeedSender, FramePacket, FrameFeed, TelemetryFrame, TelemetrySnapshot, TelemetrySource, VarData, VariableInfo,
    VariableSchema, VariableType,
};
