//! Per-view item snapshots with optimistic patches.
//!
//! Each open view (the desktop or one folder window) owns an ordered list
//! of items. Full refreshes replace a list wholesale and are guarded by a
//! per-view monotonic ticket, so a slow response never overwrites a newer
//! one. Optimistic patches record the pre-patch entry of the touched item
//! in every affected view; rollback restores exactly those entries unless
//! a full refresh already replaced the view.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use deskhub_core::types::ItemId;
use deskhub_entity::Item;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Identity of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewKey {
    Desktop,
    Folder(ItemId),
}

impl ViewKey {
    /// The view that shows `item`.
    pub fn of(item: &Item) -> Self {
        Self::of_parent(item.parent_id)
    }

    pub fn of_parent(parent_id: Option<ItemId>) -> Self {
        match parent_id {
            Some(folder_id) => Self::Folder(folder_id),
            None => Self::Desktop,
        }
    }
}

/// A local change to apply before the server confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalPatch {
    /// Put the item in the view its `parent_id` names, replacing any copy
    /// there and removing it from every other view.
    Upsert(Item),
    /// Remove the item from every view.
    Remove(ItemId),
}

impl LocalPatch {
    fn item_id(&self) -> ItemId {
        match self {
            Self::Upsert(item) => item.id,
            Self::Remove(id) => *id,
        }
    }
}

/// Read-only copy of one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub items: Vec<Item>,
    pub last_refreshed: Option<DateTime<Utc>>,
}

/// Handle for a pending optimistic patch.
#[must_use = "an optimistic patch must be committed or rolled back"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct OptimisticToken(u64);

/// Permission to replace a view with the result of one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    view: ViewKey,
    seq: u64,
}

impl RefreshTicket {
    pub fn view(&self) -> ViewKey {
        self.view
    }
}

#[derive(Debug, Default)]
struct ViewState {
    items: Vec<Item>,
    last_refreshed: Option<DateTime<Utc>>,
    /// Bumped by every full replace.
    generation: u64,
    issued: u64,
    applied: u64,
}

#[derive(Debug)]
struct PreImage {
    view: ViewKey,
    generation: u64,
    before: Option<(usize, Item)>,
}

#[derive(Debug, Default)]
struct StoreState {
    views: HashMap<ViewKey, ViewState>,
    pending: HashMap<u64, (ItemId, Vec<PreImage>)>,
    next_token: u64,
}

/// Snapshot store shared by the mutator, the sync channel, and the poller.
#[derive(Debug)]
pub struct SnapshotStore {
    state: Mutex<StoreState>,
    revision: watch::Sender<u64>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            revision: watch::Sender::new(0),
        }
    }

    /// Start tracking a view. Returns `false` if it was already open.
    pub fn open_view(&self, view: ViewKey) -> bool {
        let opened = {
            let mut state = self.lock();
            if state.views.contains_key(&view) {
                false
            } else {
                state.views.insert(view, ViewState::default());
                true
            }
        };
        if opened {
            self.bump();
        }
        opened
    }

    /// Stop tracking a view and discard its items.
    pub fn close_view(&self, view: ViewKey) -> bool {
        let closed = self.lock().views.remove(&view).is_some();
        if closed {
            self.bump();
        }
        closed
    }

    pub fn is_open(&self, view: ViewKey) -> bool {
        self.lock().views.contains_key(&view)
    }

    pub fn open_views(&self) -> Vec<ViewKey> {
        let mut views: Vec<ViewKey> = self.lock().views.keys().copied().collect();
        views.sort();
        views
    }

    pub fn items(&self, view: ViewKey) -> Option<Vec<Item>> {
        self.lock().views.get(&view).map(|v| v.items.clone())
    }

    pub fn snapshot(&self, view: ViewKey) -> Option<ViewSnapshot> {
        self.lock().views.get(&view).map(|v| ViewSnapshot {
            items: v.items.clone(),
            last_refreshed: v.last_refreshed,
        })
    }

    /// The item as currently shown, desktop first.
    pub fn find(&self, item_id: ItemId) -> Option<Item> {
        let state = self.lock();
        let mut views: Vec<(&ViewKey, &ViewState)> = state.views.iter().collect();
        views.sort_by_key(|(key, _)| **key);
        views
            .into_iter()
            .find_map(|(_, view)| view.items.iter().find(|i| i.id == item_id).cloned())
    }

    /// The item as shown in one view.
    pub fn item_in(&self, view: ViewKey, item_id: ItemId) -> Option<Item> {
        self.lock()
            .views
            .get(&view)
            .and_then(|v| v.items.iter().find(|i| i.id == item_id).cloned())
    }

    pub fn contains(&self, view: ViewKey, item_id: ItemId) -> bool {
        self.lock()
            .views
            .get(&view)
            .map(|v| v.items.iter().any(|i| i.id == item_id))
            .unwrap_or(false)
    }

    /// Apply `patch` to every open view it touches.
    pub fn apply_optimistic(&self, patch: LocalPatch) -> OptimisticToken {
        let token = {
            let mut state = self.lock();
            let images = match &patch {
                LocalPatch::Upsert(item) => upsert(&mut state.views, item),
                LocalPatch::Remove(id) => remove(&mut state.views, *id),
            };
            let token = state.next_token;
            state.next_token += 1;
            trace!(
                token,
                item_id = %patch.item_id(),
                views = images.len(),
                "Optimistic patch applied"
            );
            state.pending.insert(token, (patch.item_id(), images));
            token
        };
        self.bump();
        OptimisticToken(token)
    }

    /// Keep the patch. Returns `false` for an unknown token.
    pub fn commit(&self, token: OptimisticToken) -> bool {
        self.lock().pending.remove(&token.0).is_some()
    }

    /// Undo the patch in every view not refreshed since it was applied.
    /// Returns `true` if any view was restored.
    pub fn rollback(&self, token: OptimisticToken) -> bool {
        let restored = {
            let mut state = self.lock();
            let Some((item_id, images)) = state.pending.remove(&token.0) else {
                return false;
            };
            let mut restored = false;
            for image in images {
                let Some(view) = state.views.get_mut(&image.view) else {
                    continue;
                };
                if view.generation != image.generation {
                    debug!(
                        view = ?image.view,
                        item_id = %item_id,
                        "View refreshed since patch, keeping server state"
                    );
                    continue;
                }
                view.items.retain(|i| i.id != item_id);
                if let Some((index, item)) = image.before {
                    let index = index.min(view.items.len());
                    view.items.insert(index, item);
                }
                restored = true;
            }
            restored
        };
        if restored {
            self.bump();
        }
        restored
    }

    /// Apply a server-confirmed item without a rollback point.
    pub fn reconcile(&self, item: Item) {
        let token = self.apply_optimistic(LocalPatch::Upsert(item));
        self.commit(token);
    }

    /// Remove an item the server no longer has. Returns `true` if any view
    /// showed it.
    pub fn forget(&self, item_id: ItemId) -> bool {
        let removed = {
            let mut state = self.lock();
            !remove(&mut state.views, item_id).is_empty()
        };
        if removed {
            self.bump();
        }
        removed
    }

    /// Issue the next refresh ticket for `view`.
    pub fn begin_refresh(&self, view: ViewKey) -> RefreshTicket {
        let mut state = self.lock();
        let seq = match state.views.get_mut(&view) {
            Some(v) => {
                v.issued += 1;
                v.issued
            }
            None => 0,
        };
        RefreshTicket { view, seq }
    }

    /// Replace a view's items with a full snapshot. Returns `false` when the
    /// view is closed or a newer refresh has already been applied.
    pub fn replace(&self, ticket: RefreshTicket, items: Vec<Item>) -> bool {
        let replaced = {
            let mut state = self.lock();
            match state.views.get_mut(&ticket.view) {
                Some(view) if ticket.seq > view.applied => {
                    let mut seen = HashSet::new();
                    view.items = items.into_iter().filter(|i| seen.insert(i.id)).collect();
                    view.applied = ticket.seq;
                    view.generation += 1;
                    view.last_refreshed = Some(Utc::now());
                    true
                }
                Some(view) => {
                    debug!(
                        view = ?ticket.view,
                        ticket = ticket.seq,
                        applied = view.applied,
                        "Ignoring stale refresh"
                    );
                    false
                }
                None => false,
            }
        };
        if replaced {
            self.bump();
        }
        replaced
    }

    /// Monotonic counter bumped on every visible change.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Watch for changes.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn upsert(views: &mut HashMap<ViewKey, ViewState>, item: &Item) -> Vec<PreImage> {
    let dest = ViewKey::of(item);
    let mut images = Vec::new();

    for (key, view) in views.iter_mut() {
        let index = view.items.iter().position(|i| i.id == item.id);
        let before = index.and_then(|i| view.items.get(i).cloned().map(|it| (i, it)));
        match (index, *key == dest) {
            (Some(i), true) => {
                if view.items[i] == *item {
                    continue;
                }
                view.items[i] = item.clone();
            }
            (Some(i), false) => {
                view.items.remove(i);
            }
            (None, true) => view.items.push(item.clone()),
            (None, false) => continue,
        }
        images.push(PreImage {
            view: *key,
            generation: view.generation,
            before,
        });
    }
    images
}

fn remove(views: &mut HashMap<ViewKey, ViewState>, item_id: ItemId) -> Vec<PreImage> {
    let mut images = Vec::new();
    for (key, view) in views.iter_mut() {
        if let Some(index) = view.items.iter().position(|i| i.id == item_id) {
            let item = view.items.remove(index);
            images.push(PreImage {
                view: *key,
                generation: view.generation,
                before: Some((index, item)),
            });
        }
    }
    images
}
