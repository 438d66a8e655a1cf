//! Item repository trait and its implementations.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use deskhub_core::events::MembershipScope;
use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_entity::{Item, ItemPatch, NewItem};

pub use memory::MemoryItemRepository;
pub use postgres::PgItemRepository;

/// Storage of desktop items.
///
/// Listing methods return items ordered by id so repeated fetches of an
/// unchanged scope are identical. Update and delete return `None` when the
/// item does not exist.
#[async_trait]
pub trait ItemRepository: Send + Sync + 'static {
    /// All items, parented or not.
    async fn find_all(&self) -> AppResult<Vec<Item>>;

    /// Find an item by id.
    async fn find_by_id(&self, id: ItemId) -> AppResult<Option<Item>>;

    /// Items directly inside `folder_id`.
    async fn find_children(&self, folder_id: ItemId) -> AppResult<Vec<Item>>;

    /// Number of items in a scope.
    async fn count_in(&self, scope: MembershipScope) -> AppResult<u64>;

    /// Insert a new item and return it with its assigned id.
    async fn create(&self, item: &NewItem) -> AppResult<Item>;

    /// Apply a single-field change.
    async fn update(&self, id: ItemId, patch: &ItemPatch) -> AppResult<Option<Item>>;

    /// Delete an item, returning the removed row.
    async fn delete(&self, id: ItemId) -> AppResult<Option<Item>>;

    /// Move every child of `folder_id` back to the desktop. Returns how many
    /// items were released.
    async fn release_children(&self, folder_id: ItemId) -> AppResult<u64>;
}
