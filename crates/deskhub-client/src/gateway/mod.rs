//! Access to the Deskhub HTTP API.

pub mod http;

use async_trait::async_trait;
use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_entity::{Dimensions, Item, Position};

pub use http::HttpGateway;

/// Every server call the client core makes.
///
/// Implementations report a missing item with
/// [`ErrorKind::NotFound`](deskhub_core::error::ErrorKind::NotFound) so
/// callers can tell it apart from other failures.
#[async_trait]
pub trait ItemGateway: Send + Sync + 'static {
    /// All items, on the desktop or in folders.
    async fn list_items(&self) -> AppResult<Vec<Item>>;

    /// Authoritative contents of one folder.
    async fn folder_items(&self, folder_id: ItemId) -> AppResult<Vec<Item>>;

    async fn update_position(&self, item_id: ItemId, position: Position) -> AppResult<Item>;

    async fn update_dimensions(&self, item_id: ItemId, dimensions: Dimensions) -> AppResult<Item>;

    async fn rename(&self, item_id: ItemId, name: &str) -> AppResult<Item>;

    async fn add_to_folder(&self, folder_id: ItemId, item_id: ItemId) -> AppResult<Item>;

    /// Take an item out of its folder, optionally placing it on the desktop.
    async fn remove_from_folder(
        &self,
        item_id: ItemId,
        position: Option<Position>,
    ) -> AppResult<Item>;

    async fn create_folder(&self, name: &str, position: Position) -> AppResult<Item>;

    async fn delete_item(&self, item_id: ItemId) -> AppResult<()>;

    /// Unparented items, the contents of the desktop view.
    async fn desktop_items(&self) -> AppResult<Vec<Item>> {
        let items = self.list_items().await?;
        Ok(items.into_iter().filter(Item::is_on_desktop).collect())
    }
}
