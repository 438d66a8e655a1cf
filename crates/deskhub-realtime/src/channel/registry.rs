//! Channel registry: folder → subscribed connections.
//!
//! Broadcasts are delivered to every connection regardless of
//! subscriptions. The registry exists for bookkeeping and logging.

use std::collections::HashSet;

use dashmap::DashMap;

use deskhub_core::types::ItemId;

use crate::connection::handle::ConnectionId;

use super::subscription::SubscriptionTracker;

/// Registry of folder subscriptions.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    folders: DashMap<ItemId, HashSet<ConnectionId>>,
    subscriptions: SubscriptionTracker,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a folder. Returns `false` if it was already
    /// subscribed.
    pub fn subscribe(&self, folder_id: ItemId, conn_id: ConnectionId) -> bool {
        self.folders.entry(folder_id).or_default().insert(conn_id);
        self.subscriptions.add(conn_id, folder_id)
    }

    /// Unsubscribes a connection from a folder.
    pub fn unsubscribe(&self, folder_id: ItemId, conn_id: ConnectionId) {
        self.detach(folder_id, conn_id);
        self.subscriptions.remove(conn_id, folder_id);
    }

    /// Unsubscribes a connection from every folder.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        for folder_id in self.subscriptions.remove_all(conn_id) {
            self.detach(folder_id, conn_id);
        }
    }

    /// Number of connections watching a folder.
    pub fn subscriber_count(&self, folder_id: ItemId) -> usize {
        self.folders
            .get(&folder_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Number of folders a connection watches.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.subscriptions.count(conn_id)
    }

    fn detach(&self, folder_id: ItemId, conn_id: ConnectionId) {
        if let Some(mut watchers) = self.folders.get_mut(&folder_id) {
            watchers.remove(&conn_id);
            if watchers.is_empty() {
                drop(watchers);
                self.folders.remove(&folder_id);
            }
        }
    }
}
