//! Background polling of a [`TelemetrySource`].
//!
//! [`LeaderboardService::spawn`] moves the source and a [`Leaderboard`] into a
//! tokio task. The task is the only writer of the pit memory, so no locking is
//! involved; readers get the latest snapshot from a watch channel.

use std::sync::Arc;

use futures::Stream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LeaderboardConfig;
use crate::leaderboard::{Leaderboard, LeaderboardSnapshot};
use crate::telemetry::TelemetrySource;
use crate::Result;

/// Handle to a running polling task. Dropping it stops the task.
pub struct LeaderboardService {
    snapshots: watch::Receiver<Arc<LeaderboardSnapshot>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LeaderboardService {
    /// Validate `config` and start polling `source` at `config.update_rate`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(source: S, config: LeaderboardConfig) -> Result<Self>
    where
        S: TelemetrySource + Send + 'static,
    {
        config.validate()?;

        let (tx, rx) = watch::channel(Arc::new(LeaderboardSnapshot::waiting()));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(Self::poll_task(source, config, tx, cancel.clone()));

        Ok(Self { snapshots: rx, cancel, task: Some(task) })
    }

    async fn poll_task<S: TelemetrySource>(
        mut source: S,
        config: LeaderboardConfig,
        tx: watch::Sender<Arc<LeaderboardSnapshot>>,
        cancel: CancellationToken,
    ) {
        let period = config.update_rate.poll_interval();
        info!(?period, rate = ?config.update_rate, "Leaderboard polling started");

        let mut leaderboard = Leaderboard::new(&config);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut live = false;
        let mut polls = 0u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            polls += 1;

            let snapshot = leaderboard.poll(&mut source);
            match (snapshot.is_waiting(), live) {
                (false, false) => debug!(polls, "Telemetry source available"),
                (true, true) => warn!(polls, "Telemetry source lost, publishing waiting snapshots"),
                _ => {}
            }
            live = !snapshot.is_waiting();

            tx.send_replace(Arc::new(snapshot));
        }

        info!(polls, "Leaderboard polling stopped");
    }

    /// Most recently published snapshot.
    pub fn latest(&self) -> Arc<LeaderboardSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Stream of snapshots, starting with the current one. Slow consumers skip ahead.
    pub fn snapshots(&self) -> impl Stream<Item = Arc<LeaderboardSnapshot>> + 'static {
        WatchStream::new(self.snapshots.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<LeaderboardSnapshot>> {
        self.snapshots.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop polling and wait for the task to finish.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LeaderboardService {
    fn drop(&mut self) {
        debug!("Dropping leaderboard service");
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpdateRate;
    use crate::test_utils::{FixtureSource, SnapshotFixture};
    use futures::StreamExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn config() -> LeaderboardConfig {
        LeaderboardConfig { update_rate: UpdateRate::Max(10), ..Default::default() }
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_snapshots_from_source() {
        let _ = tracing_subscriber::fmt::try_init();
        let service = LeaderboardService::spawn(FixtureSource::connected(SnapshotFixture::field(4)), config()).unwrap();

        let snapshot = tokio::time::timeout(
            Duration::from_secs(1),
            service.snapshots().filter(|s| futures::future::ready(!s.is_waiting())).next(),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(snapshot.cars.len(), 3);
        assert_eq!(service.latest().cars.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnected_source_yields_waiting() {
        let mut service = LeaderboardService::spawn(FixtureSource::disconnected(), config()).unwrap();
        let mut rx = service.subscribe();

        rx.changed().await.unwrap();
        assert!(rx.borrow().is_waiting());

        service.shutdown().await;
        assert!(service.cancel_token().is_cancelled());
    }

    /// Connected until the shared flag is cleared.
    struct FlakySource {
        up: Arc<AtomicBool>,
        inner: FixtureSource,
    }

    impl TelemetrySource for FlakySource {
        type Snapshot = SnapshotFixture;

        fn ensure_connected(&mut self) -> Result<()> {
            if self.up.load(Ordering::SeqCst) {
                self.inner.ensure_connected()
            } else {
                Err(crate::StandingsError::connection_failed("source went away"))
            }
        }

        fn snapshot(&mut self) -> Option<SnapshotFixture> {
            self.inner.snapshot()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lost_source_switches_to_waiting() {
        let up = Arc::new(AtomicBool::new(true));
        let source = FlakySource { up: Arc::clone(&up), inner: FixtureSource::connected(SnapshotFixture::field(3)) };
        let service = LeaderboardService::spawn(source, config()).unwrap();
        let wait_for = |waiting: bool| {
            let matching = service.snapshots().filter(move |s| futures::future::ready(s.is_waiting() == waiting));
            tokio::time::timeout(Duration::from_secs(1), async move { Box::pin(matching).next().await })
        };

        let live = wait_for(false).await.unwrap().unwrap();
        assert_eq!(live.cars.len(), 2);

        up.store(false, Ordering::SeqCst);
        assert!(wait_for(true).await.unwrap().unwrap().cars.is_empty());

        up.store(true, Ordering::SeqCst);
        assert_eq!(wait_for(false).await.unwrap().unwrap().cars.len(), 2);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = LeaderboardConfig { neighbor_limit: 0, ..Default::default() };
        let result = LeaderboardService::spawn(FixtureSource::disconnected(), config);
        assert!(matches!(result, Err(crate::StandingsError::Config { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_task() {
        let service = LeaderboardService::spawn(FixtureSource::connected(SnapshotFixture::field(2)), config()).unwrap();
        let token = service.cancel_token();
        let mut rx = service.subscribe();

        drop(service);
        assert!(token.is_cancelled());
        // the task exits and drops its sender
        tokio::time::timeout(Duration::from_secs(1), async {
            while rx.changed().await.is_ok() {}
        })
        .await
        .unwrap();
    }
}
