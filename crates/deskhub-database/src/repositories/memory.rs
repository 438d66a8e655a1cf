//! In-memory item repository.
//!
//! Used when no database URL is configured and by the test suites.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use deskhub_core::events::MembershipScope;
use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_entity::{Item, ItemPatch, NewItem};

use super::ItemRepository;

/// Item repository holding everything in a concurrent map.
#[derive(Debug)]
pub struct MemoryItemRepository {
    items: DashMap<ItemId, Item>,
    next_id: AtomicI64,
}

impl MemoryItemRepository {
    /// Create an empty repository. Ids start at 1.
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn collect_sorted(&self, keep: impl Fn(&Item) -> bool) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .items
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by_key(|item| item.id);
        items
    }
}

impl Default for MemoryItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn find_all(&self) -> AppResult<Vec<Item>> {
        Ok(self.collect_sorted(|_| true))
    }

    async fn find_by_id(&self, id: ItemId) -> AppResult<Option<Item>> {
        Ok(self.items.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_children(&self, folder_id: ItemId) -> AppResult<Vec<Item>> {
        Ok(self.collect_sorted(|item| item.parent_id == Some(folder_id)))
    }

    async fn count_in(&self, scope: MembershipScope) -> AppResult<u64> {
        let count = self
            .items
            .iter()
            .filter(|entry| MembershipScope::of_parent(entry.value().parent_id) == scope)
            .count();
        Ok(count as u64)
    }

    async fn create(&self, item: &NewItem) -> AppResult<Item> {
        let id = ItemId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let created = item.clone().into_item(id);
        self.items.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: ItemId, patch: &ItemPatch) -> AppResult<Option<Item>> {
        Ok(self.items.get_mut(&id).map(|mut entry| {
            patch.apply_to(entry.value_mut());
            entry.value().clone()
        }))
    }

    async fn delete(&self, id: ItemId) -> AppResult<Option<Item>> {
        Ok(self.items.remove(&id).map(|(_, item)| item))
    }

    async fn release_children(&self, folder_id: ItemId) -> AppResult<u64> {
        let mut released = 0;
        for mut entry in self.items.iter_mut() {
            if entry.value().parent_id == Some(folder_id) {
                entry.value_mut().parent_id = None;
                released += 1;
            }
        }
        Ok(released)
    }
}
