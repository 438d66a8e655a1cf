//! Connection state shared by the channel and the poller.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::snapshot::ViewKey;

/// Lifecycle of the sync channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug)]
struct Health {
    /// When the channel last stopped being connected.
    down_since: Option<Instant>,
    timed_out: HashSet<ViewKey>,
}

/// Observable channel state plus the views that need polling.
#[derive(Debug)]
pub struct SyncStatus {
    state: watch::Sender<ChannelState>,
    health: Mutex<Health>,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncStatus {
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(ChannelState::Disconnected),
            health: Mutex::new(Health {
                down_since: Some(Instant::now()),
                timed_out: HashSet::new(),
            }),
        }
    }

    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<ChannelState> {
        self.state.subscribe()
    }

    pub fn set_state(&self, next: ChannelState) {
        {
            let mut health = self.lock();
            match next {
                ChannelState::Connected => health.down_since = None,
                ChannelState::Connecting | ChannelState::Disconnected => {
                    if health.down_since.is_none() {
                        health.down_since = Some(Instant::now());
                    }
                }
            }
        }
        self.state.send_replace(next);
    }

    /// How long the channel has been unusable, `None` while connected.
    pub fn down_for(&self) -> Option<Duration> {
        self.down_since().map(|since| since.elapsed())
    }

    /// When the channel last stopped being connected.
    pub fn down_since(&self) -> Option<Instant> {
        self.lock().down_since
    }

    pub fn mark_timed_out(&self, view: ViewKey) {
        self.lock().timed_out.insert(view);
    }

    pub fn clear_timed_out(&self, view: ViewKey) {
        self.lock().timed_out.remove(&view);
    }

    pub fn timed_out_views(&self) -> Vec<ViewKey> {
        let mut views: Vec<ViewKey> = self.lock().timed_out.iter().copied().collect();
        views.sort();
        views
    }

    fn lock(&self) -> MutexGuard<'_, Health> {
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
