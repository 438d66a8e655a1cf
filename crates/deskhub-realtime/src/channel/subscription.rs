//! Subscription tracking: which folders each connection watches.

use std::collections::HashSet;

use dashmap::DashMap;

use deskhub_core::types::ItemId;

use crate::connection::handle::ConnectionId;

/// Tracks connection-to-folder subscription mappings (reverse index).
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    conn_to_folders: DashMap<ConnectionId, HashSet<ItemId>>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription. Returns `false` if it already existed.
    pub fn add(&self, conn_id: ConnectionId, folder_id: ItemId) -> bool {
        self.conn_to_folders
            .entry(conn_id)
            .or_default()
            .insert(folder_id)
    }

    /// Removes a subscription.
    pub fn remove(&self, conn_id: ConnectionId, folder_id: ItemId) {
        if let Some(mut folders) = self.conn_to_folders.get_mut(&conn_id) {
            folders.remove(&folder_id);
        }
    }

    /// Returns the number of subscriptions for a connection.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_folders
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes all subscriptions for a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<ItemId> {
        self.conn_to_folders
            .remove(&conn_id)
            .map(|(_, folders)| folders)
            .unwrap_or_default()
    }
}
