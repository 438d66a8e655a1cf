//! Open folder windows.
//!
//! Windows are kept in stacking order, the last one focused and on top.
//! The registry hands out live region providers for drop hit-testing and
//! the list of folders the sync channel must keep fresh.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use deskhub_core::types::ItemId;
use tracing::debug;

use crate::geometry::Rect;
use crate::target::RegionProvider;

/// Result of asking for a folder window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOpen {
    Opened,
    /// The folder was already open and has been raised instead.
    Refocused,
}

/// One open folder window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderWindow {
    pub folder_id: ItemId,
    pub rect: Rect,
}

#[derive(Debug, Default)]
struct RegistryState {
    windows: Vec<FolderWindow>,
}

impl RegistryState {
    fn index_of(&self, folder_id: ItemId) -> Option<usize> {
        self.windows.iter().position(|w| w.folder_id == folder_id)
    }
}

/// Set of open folder windows. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `folder_id` at `rect`, or raise it if it is already open.
    pub fn open_folder_view(&self, folder_id: ItemId, rect: Rect) -> ViewOpen {
        let mut state = self.lock();
        if let Some(index) = state.index_of(folder_id) {
            let window = state.windows.remove(index);
            state.windows.push(window);
            debug!(folder_id = %folder_id, "Folder view refocused");
            return ViewOpen::Refocused;
        }
        state.windows.push(FolderWindow { folder_id, rect });
        debug!(folder_id = %folder_id, "Folder view opened");
        ViewOpen::Opened
    }

    /// Close a window. Returns `false` if it was not open.
    pub fn close_folder_view(&self, folder_id: ItemId) -> bool {
        let mut state = self.lock();
        match state.index_of(folder_id) {
            Some(index) => {
                state.windows.remove(index);
                debug!(folder_id = %folder_id, "Folder view closed");
                true
            }
            None => false,
        }
    }

    /// Raise an open window. Returns `false` if it is not open.
    pub fn focus(&self, folder_id: ItemId) -> bool {
        let mut state = self.lock();
        let Some(index) = state.index_of(folder_id) else {
            return false;
        };
        let window = state.windows.remove(index);
        state.windows.push(window);
        true
    }

    /// Move or resize an open window.
    pub fn set_window_rect(&self, folder_id: ItemId, rect: Rect) -> bool {
        let mut state = self.lock();
        match state.index_of(folder_id) {
            Some(index) => {
                state.windows[index].rect = rect;
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self, folder_id: ItemId) -> bool {
        self.lock().index_of(folder_id).is_some()
    }

    /// Open folders, bottom to top.
    pub fn open_folders(&self) -> Vec<ItemId> {
        self.lock().windows.iter().map(|w| w.folder_id).collect()
    }

    pub fn windows(&self) -> Vec<FolderWindow> {
        self.lock().windows.clone()
    }

    pub fn focused(&self) -> Option<ItemId> {
        self.lock().windows.last().map(|w| w.folder_id)
    }

    pub fn window_rect(&self, folder_id: ItemId) -> Option<Rect> {
        let state = self.lock();
        state.index_of(folder_id).map(|i| state.windows[i].rect)
    }

    /// Live bounds of a folder window; `None` once it is closed.
    pub fn window_region(&self, folder_id: ItemId) -> impl RegionProvider {
        let registry = self.clone();
        move || registry.window_rect(folder_id)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
