//! Drop target registration and hit-testing.
//!
//! Every visible droppable region (an open folder window, a folder icon,
//! the desktop background) registers a [`RegionProvider`] that reports its
//! current geometry. Providers are queried on every resolve, so windows can
//! move or resize mid-drag, and a provider whose element is gone reports
//! `None` and is never hit.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use deskhub_core::types::ItemId;
use deskhub_entity::Position;
use tracing::trace;

use crate::geometry::Rect;

/// What a drop lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    /// The empty desktop canvas.
    Desktop,
    /// A folder, through its window or its icon.
    Folder(ItemId),
}

/// Stacking class of a region. Higher wins when regions overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetPriority {
    DesktopBackground,
    FolderIcon,
    FolderWindow,
}

/// Result of resolving a drop for a specific dragged item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The topmost region under the pointer.
    Target(DropTarget),
    /// The topmost region belongs to the dragged item itself.
    SelfDrop,
    /// No region contains the pointer.
    Nothing,
}

/// Live geometry of a registered region.
pub trait RegionProvider: Send + Sync + 'static {
    /// The current bounds, or `None` once the element is no longer shown.
    fn region(&self) -> Option<Rect>;
}

impl<F> RegionProvider for F
where
    F: Fn() -> Option<Rect> + Send + Sync + 'static,
{
    fn region(&self) -> Option<Rect> {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TargetKey {
    target: DropTarget,
    priority: TargetPriority,
}

struct Entry {
    seq: u64,
    provider: Arc<dyn RegionProvider>,
}

#[derive(Default)]
struct ResolverInner {
    entries: DashMap<TargetKey, Entry>,
    next_seq: AtomicU64,
}

/// Registry of droppable regions with priority hit-testing.
///
/// A target registers at most once per priority class; registering again
/// replaces the old entry and makes it the most recent.
#[derive(Clone, Default)]
pub struct DropTargetResolver {
    inner: Arc<ResolverInner>,
}

impl fmt::Debug for DropTargetResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropTargetResolver")
            .field("registrations", &self.inner.entries.len())
            .finish()
    }
}

impl DropTargetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a region. Dropping the returned guard unregisters it.
    #[must_use = "the region is unregistered when the guard is dropped"]
    pub fn register_target(
        &self,
        target: DropTarget,
        provider: impl RegionProvider,
        priority: TargetPriority,
    ) -> TargetRegistration {
        let key = TargetKey { target, priority };
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        self.inner.entries.insert(
            key,
            Entry {
                seq,
                provider: Arc::new(provider),
            },
        );
        trace!(?target, ?priority, seq, "Drop target registered");

        TargetRegistration {
            resolver: Arc::downgrade(&self.inner),
            key,
            seq,
        }
    }

    /// Remove every registration of `target`, whatever its priority.
    pub fn unregister_target(&self, target: DropTarget) {
        self.inner.entries.retain(|key, _| key.target != target);
        trace!(?target, "Drop target unregistered");
    }

    /// The topmost target whose region contains `pointer`.
    pub fn resolve(&self, pointer: Position) -> Option<DropTarget> {
        self.hits(pointer).first().map(|(key, _)| key.target)
    }

    /// Like [`resolve`](Self::resolve), but a folder dropped onto its own
    /// region is reported as [`Resolution::SelfDrop`].
    pub fn resolve_for(&self, pointer: Position, dragged: ItemId) -> Resolution {
        match self.hits(pointer).first() {
            Some((key, _)) if key.target == DropTarget::Folder(dragged) => Resolution::SelfDrop,
            Some((key, _)) => Resolution::Target(key.target),
            None => Resolution::Nothing,
        }
    }

    pub fn registration_count(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_registered(&self, target: DropTarget, priority: TargetPriority) -> bool {
        self.inner
            .entries
            .contains_key(&TargetKey { target, priority })
    }

    /// Regions containing `pointer`, topmost first.
    fn hits(&self, pointer: Position) -> Vec<(TargetKey, u64)> {
        // Snapshot providers first so none runs under a map shard lock.
        let candidates: Vec<(TargetKey, u64, Arc<dyn RegionProvider>)> = self
            .inner
            .entries
            .iter()
            .map(|e| (*e.key(), e.value().seq, e.value().provider.clone()))
            .collect();

        let mut hits: Vec<(TargetKey, u64)> = candidates
            .into_iter()
            .filter(|(_, _, provider)| {
                provider
                    .region()
                    .map(|rect| rect.contains(pointer))
                    .unwrap_or(false)
            })
            .map(|(key, seq, _)| (key, seq))
            .collect();

        hits.sort_by(|(a, a_seq), (b, b_seq)| {
            b.priority.cmp(&a.priority).then(b_seq.cmp(a_seq))
        });
        hits
    }
}

/// Keeps a region registered for as long as it lives.
#[derive(Debug)]
pub struct TargetRegistration {
    resolver: Weak<ResolverInner>,
    key: TargetKey,
    seq: u64,
}

impl TargetRegistration {
    pub fn target(&self) -> DropTarget {
        self.key.target
    }
}

impl Drop for TargetRegistration {
    fn drop(&mut self) {
        if let Some(inner) = self.resolver.upgrade() {
            // A newer registration under the same key stays.
            inner
                .entries
                .remove_if(&self.key, |_, entry| entry.seq == self.seq);
        }
    }
}
