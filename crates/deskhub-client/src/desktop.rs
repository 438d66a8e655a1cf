//! The desktop session: views, drag and drop, mutations, and sync wired
//! together.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use deskhub_core::config::ClientConfig;
use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_entity::{Item, Position};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::drag::{DragController, DragIndicator, DragOutcome, DragPhase};
use crate::error::DragError;
use crate::gateway::ItemGateway;
use crate::geometry::{ICON_SIZE, Rect};
use crate::mutator::FolderMembershipMutator;
use crate::notice::{Notice, NoticeSink};
use crate::snapshot::{SnapshotStore, ViewKey};
use crate::sync::{
    ChannelState, Connector, FallbackPoller, LiveSyncChannel, Refresher, SyncStatus,
};
use crate::target::{
    DropTarget, DropTargetResolver, RegionProvider, TargetPriority, TargetRegistration,
};
use crate::views::{ViewOpen, ViewRegistry};

/// What a pointer release ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropReport {
    /// The applied outcome. A move the mutator rejected before touching
    /// any state is reported as [`DragOutcome::NoOp`].
    pub outcome: DragOutcome,
    /// The server's copy of the moved item, when the move succeeded.
    pub item: Option<Item>,
}

impl DropReport {
    fn new(outcome: DragOutcome, item: Option<Item>) -> Self {
        Self { outcome, item }
    }

    pub fn succeeded(&self) -> bool {
        self.item.is_some()
    }
}

struct DesktopInner {
    snapshots: Arc<SnapshotStore>,
    resolver: DropTargetResolver,
    drag: DragController,
    mutator: FolderMembershipMutator,
    views: ViewRegistry,
    sync: LiveSyncChannel,
    poller: FallbackPoller,
    notices: NoticeSink,
    window_targets: Mutex<HashMap<ItemId, TargetRegistration>>,
    icon_targets: Mutex<HashMap<ItemId, TargetRegistration>>,
    _canvas: TargetRegistration,
}

impl Drop for DesktopInner {
    fn drop(&mut self) {
        self.sync.shutdown();
        self.poller.shutdown();
    }
}

/// One user's desktop. Cloning shares the session.
#[derive(Clone)]
pub struct Desktop {
    inner: Arc<DesktopInner>,
}

impl std::fmt::Debug for Desktop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desktop")
            .field("open_folders", &self.inner.views.open_folders())
            .field("sync", &self.inner.sync.state())
            .finish()
    }
}

impl Desktop {
    /// Load the desktop and start syncing.
    pub async fn start(
        config: &ClientConfig,
        gateway: Arc<dyn ItemGateway>,
        connector: Arc<dyn Connector>,
    ) -> AppResult<Self> {
        let snapshots = Arc::new(SnapshotStore::new());
        snapshots.open_view(ViewKey::Desktop);
        let refresher = Refresher::new(gateway.clone(), snapshots.clone());
        refresher.refresh(ViewKey::Desktop).await?;

        let notices = NoticeSink::default();
        let resolver = DropTargetResolver::new();
        let canvas = resolver.register_target(
            DropTarget::Desktop,
            || Some(Rect::canvas()),
            TargetPriority::DesktopBackground,
        );
        let views = ViewRegistry::new();
        let status = Arc::new(SyncStatus::new());

        let sync = LiveSyncChannel::spawn(
            connector,
            refresher.clone(),
            views.clone(),
            status.clone(),
            config,
        );
        let poller = FallbackPoller::spawn(
            refresher,
            views.clone(),
            status,
            notices.clone(),
            config.poll_interval(),
        );

        let desktop = Self {
            inner: Arc::new(DesktopInner {
                drag: DragController::new(config.drag_threshold_px, resolver.clone()),
                mutator: FolderMembershipMutator::new(gateway, snapshots.clone(), notices.clone()),
                snapshots,
                resolver,
                views,
                sync,
                poller,
                notices,
                window_targets: Mutex::new(HashMap::new()),
                icon_targets: Mutex::new(HashMap::new()),
                _canvas: canvas,
            }),
        };
        desktop.sync_icon_targets();

        info!(items = desktop.desktop_items().len(), "Desktop loaded");
        Ok(desktop)
    }

    pub fn snapshots(&self) -> &Arc<SnapshotStore> {
        &self.inner.snapshots
    }

    pub fn mutator(&self) -> &FolderMembershipMutator {
        &self.inner.mutator
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.inner.views
    }

    pub fn resolver(&self) -> &DropTargetResolver {
        &self.inner.resolver
    }

    pub fn sync(&self) -> &LiveSyncChannel {
        &self.inner.sync
    }

    pub fn sync_state(&self) -> ChannelState {
        self.inner.sync.state()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.snapshots.changes()
    }

    pub fn drag_indicator(&self) -> DragIndicator {
        self.inner.drag.indicator()
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.inner.drag.phase()
    }

    pub fn desktop_items(&self) -> Vec<Item> {
        self.inner
            .snapshots
            .items(ViewKey::Desktop)
            .unwrap_or_default()
    }

    pub fn folder_items(&self, folder_id: ItemId) -> Option<Vec<Item>> {
        self.inner.snapshots.items(ViewKey::Folder(folder_id))
    }

    /// Open a folder window at `rect`, or raise it if already open.
    pub async fn open_folder(&self, folder_id: ItemId, rect: Rect) -> AppResult<ViewOpen> {
        match self.inner.views.open_folder_view(folder_id, rect) {
            ViewOpen::Refocused => {
                self.register_window(folder_id);
                Ok(ViewOpen::Refocused)
            }
            ViewOpen::Opened => {
                self.inner.snapshots.open_view(ViewKey::Folder(folder_id));
                self.register_window(folder_id);
                self.inner.sync.subscribe(folder_id);

                match self.inner.sync.request_refresh(folder_id).await {
                    Ok(_) => Ok(ViewOpen::Opened),
                    Err(err) => {
                        self.close_folder(folder_id);
                        self.inner
                            .notices
                            .push(Notice::error(err.message.clone()).for_item(folder_id));
                        Err(err)
                    }
                }
            }
        }
    }

    /// Close a folder window. Returns `false` if it was not open.
    pub fn close_folder(&self, folder_id: ItemId) -> bool {
        let closed = self.inner.views.close_folder_view(folder_id);
        lock(&self.inner.window_targets).remove(&folder_id);
        self.inner.snapshots.close_view(ViewKey::Folder(folder_id));
        if closed {
            self.inner.sync.unsubscribe(folder_id);
        }
        closed
    }

    pub fn focus_folder(&self, folder_id: ItemId) -> bool {
        let focused = self.inner.views.focus(folder_id);
        if focused {
            self.register_window(folder_id);
        }
        focused
    }

    pub fn move_window(&self, folder_id: ItemId, rect: Rect) -> bool {
        self.inner.views.set_window_rect(folder_id, rect)
    }

    /// Press on an item shown in an open view.
    pub fn pointer_down(&self, item_id: ItemId, pointer: Position) -> Result<(), DragError> {
        let item = self
            .inner
            .snapshots
            .find(item_id)
            .ok_or(DragError::NotInView(item_id))?;
        self.sync_icon_targets();
        self.inner.drag.begin_drag(&item, pointer)
    }

    /// Track the pointer; returns the hovered drop target.
    pub fn pointer_move(&self, pointer: Position) -> Option<DropTarget> {
        self.inner.drag.update_pointer(pointer)
    }

    pub fn cancel_drag(&self) {
        self.inner.drag.cancel();
    }

    /// Release the pointer and carry out the resulting move.
    pub async fn pointer_up(&self, pointer: Position) -> DropReport {
        let outcome = self.inner.drag.end_drag(pointer);
        self.apply(outcome).await
    }

    /// Carry out a drag outcome. Mutation errors end up as notices.
    pub async fn apply(&self, outcome: DragOutcome) -> DropReport {
        let result = match outcome {
            DragOutcome::Select(_) | DragOutcome::NoOp => return DropReport::new(outcome, None),
            DragOutcome::MovedToFolder { item_id, folder_id } => {
                self.inner.mutator.move_to_folder(item_id, folder_id).await
            }
            DragOutcome::MovedToDesktop { item_id, position } => {
                self.inner.mutator.move_to_desktop(item_id, position).await
            }
        };

        match result {
            Ok(item) => DropReport::new(outcome, Some(item)),
            Err(err) if err.is_rejection() => {
                debug!(?outcome, error = %err, "Drop rejected");
                DropReport::new(DragOutcome::NoOp, None)
            }
            Err(_) => DropReport::new(outcome, None),
        }
    }

    /// Delete an item, closing its window if it is an open folder.
    pub async fn delete_item(&self, item_id: ItemId) -> AppResult<()> {
        self.inner.mutator.delete_item(item_id).await?;
        if self.inner.views.is_open(item_id) {
            self.close_folder(item_id);
        }
        Ok(())
    }

    /// Stop the sync channel and the poller.
    pub fn shutdown(&self) {
        self.inner.drag.cancel();
        self.inner.sync.shutdown();
        self.inner.poller.shutdown();
    }

    fn register_window(&self, folder_id: ItemId) {
        let registration = self.inner.resolver.register_target(
            DropTarget::Folder(folder_id),
            self.inner.views.window_region(folder_id),
            TargetPriority::FolderWindow,
        );
        lock(&self.inner.window_targets).insert(folder_id, registration);
    }

    /// Register an icon target for every folder on the desktop and drop
    /// the ones whose folder is gone.
    fn sync_icon_targets(&self) {
        let folders: HashSet<ItemId> = self
            .desktop_items()
            .iter()
            .filter(|item| item.is_folder())
            .map(|item| item.id)
            .collect();

        let mut icons = lock(&self.inner.icon_targets);
        icons.retain(|id, _| folders.contains(id));
        for folder_id in folders {
            icons.entry(folder_id).or_insert_with(|| {
                self.inner.resolver.register_target(
                    DropTarget::Folder(folder_id),
                    icon_region(self.inner.snapshots.clone(), folder_id),
                    TargetPriority::FolderIcon,
                )
            });
        }
    }
}

/// Live bounds of a folder's desktop icon.
fn icon_region(snapshots: Arc<SnapshotStore>, folder_id: ItemId) -> impl RegionProvider {
    move || {
        snapshots
            .item_in(ViewKey::Desktop, folder_id)
            .map(|folder| Rect::at(folder.position, ICON_SIZE))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
