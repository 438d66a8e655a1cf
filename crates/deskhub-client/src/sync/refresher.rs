//! Full-snapshot refresh over HTTP.

use std::sync::Arc;

use deskhub_core::result::AppResult;
use deskhub_entity::Item;
use tracing::trace;

use crate::gateway::ItemGateway;
use crate::snapshot::{SnapshotStore, ViewKey};

/// Fetches authoritative view contents and replaces snapshots with them.
#[derive(Clone)]
pub struct Refresher {
    gateway: Arc<dyn ItemGateway>,
    snapshots: Arc<SnapshotStore>,
}

impl std::fmt::Debug for Refresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refresher").finish_non_exhaustive()
    }
}

impl Refresher {
    pub fn new(gateway: Arc<dyn ItemGateway>, snapshots: Arc<SnapshotStore>) -> Self {
        Self { gateway, snapshots }
    }

    pub fn snapshots(&self) -> &Arc<SnapshotStore> {
        &self.snapshots
    }

    pub fn gateway(&self) -> &Arc<dyn ItemGateway> {
        &self.gateway
    }

    /// Current server contents of `view`.
    pub async fn fetch(&self, view: ViewKey) -> AppResult<Vec<Item>> {
        match view {
            ViewKey::Desktop => self.gateway.desktop_items().await,
            ViewKey::Folder(folder_id) => self.gateway.folder_items(folder_id).await,
        }
    }

    /// Refetch `view` and replace its snapshot. Returns `false` if a newer
    /// refresh won or the view was closed meanwhile.
    pub async fn refresh(&self, view: ViewKey) -> AppResult<bool> {
        let ticket = self.snapshots.begin_refresh(view);
        let items = self.fetch(view).await?;
        let replaced = self.snapshots.replace(ticket, items);
        trace!(?view, replaced, "HTTP refresh");
        Ok(replaced)
    }
}
