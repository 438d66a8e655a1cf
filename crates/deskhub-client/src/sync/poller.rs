//! Interval polling while the sync channel cannot be trusted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::refresher::Refresher;
use super::status::SyncStatus;
use crate::notice::{Notice, NoticeSink};
use crate::snapshot::ViewKey;
use crate::views::ViewRegistry;

/// Lower bound for the poll interval; tokio rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Background task refreshing open views every poll interval when the
/// channel has been down for at least one interval, and refreshing views
/// whose last channel refresh timed out.
#[derive(Debug, Clone)]
pub struct FallbackPoller {
    shutdown: Arc<watch::Sender<bool>>,
}

struct PollTask {
    refresher: Refresher,
    views: ViewRegistry,
    status: Arc<SyncStatus>,
    notices: NoticeSink,
    interval: Duration,
    failing: bool,
}

impl FallbackPoller {
    pub fn spawn(
        refresher: Refresher,
        views: ViewRegistry,
        status: Arc<SyncStatus>,
        notices: NoticeSink,
        interval: Duration,
    ) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = PollTask {
            refresher,
            views,
            status,
            notices,
            interval,
            failing: false,
        };
        tokio::spawn(task.run(shutdown_rx));
        Self {
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

impl PollTask {
    async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let interval = self.interval.max(MIN_INTERVAL);
        let mut state_rx = self.status.watch();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        let mut last_fallback: Option<Instant> = None;

        loop {
            // Fallback polls run on their own clock, anchored to the moment
            // the channel went down.
            let fallback_at = self.status.down_since().map(|since| {
                let first = since + interval;
                match last_fallback {
                    Some(last) => first.max(last + interval),
                    None => first,
                }
            });

            tokio::select! {
                _ = sleep_until_some(fallback_at) => {
                    self.poll_views(self.open_views()).await;
                    last_fallback = Some(Instant::now());
                }
                _ = ticker.tick() => {
                    if !self.fallback_active(interval) {
                        self.poll_views(self.timed_out_views()).await;
                    }
                }
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("Fallback poller stopped");
    }

    fn fallback_active(&self, interval: Duration) -> bool {
        self.status
            .down_for()
            .map(|down| down >= interval)
            .unwrap_or(false)
    }

    /// Every open view, desktop first.
    fn open_views(&self) -> Vec<ViewKey> {
        let mut views: Vec<ViewKey> = self
            .views
            .open_folders()
            .into_iter()
            .map(ViewKey::Folder)
            .collect();
        if self.refresher.snapshots().is_open(ViewKey::Desktop) {
            views.insert(0, ViewKey::Desktop);
        }
        views
    }

    /// Open views whose last channel refresh went unanswered.
    fn timed_out_views(&self) -> Vec<ViewKey> {
        let snapshots = self.refresher.snapshots();
        self.status
            .timed_out_views()
            .into_iter()
            .filter(|view| snapshots.is_open(*view))
            .collect()
    }

    async fn poll_views(&mut self, views: Vec<ViewKey>) {
        if views.is_empty() {
            return;
        }
        debug!(count = views.len(), "Polling views");

        let mut failed = false;
        for view in views {
            if let Err(e) = self.refresher.refresh(view).await {
                warn!(?view, error = %e, "Poll refresh failed");
                failed = true;
            }
        }

        if failed && !self.failing {
            self.notices
                .push(Notice::warning("Unable to reach the server, showing cached contents"));
        }
        self.failing = failed;
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
