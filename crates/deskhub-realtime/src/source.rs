//! Where folder contents come from when a client asks for a refresh.

use async_trait::async_trait;

use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_entity::Item;
use deskhub_service::ItemService;

/// Supplies the authoritative membership of a folder.
#[async_trait]
pub trait FolderContentsSource: Send + Sync {
    /// Current contents of `folder_id`.
    async fn folder_contents(&self, folder_id: ItemId) -> AppResult<Vec<Item>>;
}

#[async_trait]
impl FolderContentsSource for ItemService {
    async fn folder_contents(&self, folder_id: ItemId) -> AppResult<Vec<Item>> {
        self.list_folder(folder_id).await
    }
}
