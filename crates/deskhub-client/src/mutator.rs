//! Optimistic item mutations.
//!
//! Every operation validates synchronously, patches the snapshot store,
//! and only then issues the server call. On success the patch is
//! committed; on failure it is rolled back and a notice is published. An
//! item the server reports missing is removed from every view instead.

use std::future::Future;
use std::sync::Arc;

use deskhub_core::error::AppError;
use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_entity::item::rules;
use deskhub_entity::{Dimensions, Item, ItemPatch, Position};
use tracing::{info, warn};

use crate::gateway::ItemGateway;
use crate::notice::{Notice, NoticeSink};
use crate::snapshot::{LocalPatch, SnapshotStore, ViewKey};

/// Message for a folder dropped into a folder.
pub const NESTED_FOLDER_MESSAGE: &str = "folders cannot be nested";

/// Performs item mutations against the snapshot store and the server.
#[derive(Clone)]
pub struct FolderMembershipMutator {
    gateway: Arc<dyn ItemGateway>,
    snapshots: Arc<SnapshotStore>,
    notices: NoticeSink,
}

impl std::fmt::Debug for FolderMembershipMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderMembershipMutator").finish_non_exhaustive()
    }
}

impl FolderMembershipMutator {
    pub fn new(
        gateway: Arc<dyn ItemGateway>,
        snapshots: Arc<SnapshotStore>,
        notices: NoticeSink,
    ) -> Self {
        Self {
            gateway,
            snapshots,
            notices,
        }
    }

    /// Put a file into a folder.
    pub async fn move_to_folder(&self, item_id: ItemId, folder_id: ItemId) -> AppResult<Item> {
        let item = self.validate_move_to_folder(item_id, folder_id)?;
        let moved = ItemPatch::EnterFolder { folder_id }.applied(&item);

        let result = self
            .optimistic_into(
                &item,
                Some(folder_id),
                LocalPatch::Upsert(moved),
                self.gateway.add_to_folder(folder_id, item_id),
            )
            .await;
        if result.is_ok() {
            info!(item_id = %item_id, folder_id = %folder_id, "Item moved into folder");
        }
        result
    }

    /// Place an item on the desktop. A folder member leaves its folder; a
    /// desktop item is only repositioned.
    pub async fn move_to_desktop(&self, item_id: ItemId, position: Position) -> AppResult<Item> {
        let item = self.known(item_id)?;
        self.reject(item_id, rules::check_position(position))?;

        match item.parent_id {
            Some(_) => {
                let patch = ItemPatch::LeaveFolder {
                    position: Some(position),
                };
                self.optimistic(
                    &item,
                    LocalPatch::Upsert(patch.applied(&item)),
                    self.gateway.remove_from_folder(item_id, Some(position)),
                )
                .await
            }
            None => {
                self.optimistic(
                    &item,
                    LocalPatch::Upsert(ItemPatch::Position(position).applied(&item)),
                    self.gateway.update_position(item_id, position),
                )
                .await
            }
        }
    }

    pub async fn rename_item(&self, item_id: ItemId, name: &str) -> AppResult<Item> {
        let item = self.known(item_id)?;
        let name = self.reject(item_id, rules::normalize_name(name))?;
        let renamed = ItemPatch::Name(name.clone()).applied(&item);

        self.optimistic(
            &item,
            LocalPatch::Upsert(renamed),
            self.gateway.rename(item_id, &name),
        )
        .await
    }

    pub async fn resize_item(&self, item_id: ItemId, dimensions: Dimensions) -> AppResult<Item> {
        let item = self.known(item_id)?;
        self.reject(item_id, rules::check_dimensions(dimensions))?;

        self.optimistic(
            &item,
            LocalPatch::Upsert(ItemPatch::Dimensions(dimensions).applied(&item)),
            self.gateway.update_dimensions(item_id, dimensions),
        )
        .await
    }

    pub async fn delete_item(&self, item_id: ItemId) -> AppResult<()> {
        let item = self.known(item_id)?;
        self.optimistic(
            &item,
            LocalPatch::Remove(item_id),
            self.gateway.delete_item(item_id),
        )
        .await?;

        if item.is_folder() {
            // Members were released to the desktop server-side.
            self.snapshots.close_view(ViewKey::Folder(item_id));
        }
        info!(item_id = %item_id, "Item deleted");
        Ok(())
    }

    /// Create a folder on the desktop. Nothing is shown until the server
    /// has assigned an id.
    pub async fn create_folder(&self, name: &str, position: Position) -> AppResult<Item> {
        let name = rules::normalize_name(name).inspect_err(|e| self.notify_rejection(None, e))?;
        rules::check_position(position).inspect_err(|e| self.notify_rejection(None, e))?;

        match self.gateway.create_folder(&name, position).await {
            Ok(folder) => {
                self.snapshots.reconcile(folder.clone());
                Ok(folder)
            }
            Err(err) => {
                self.notices
                    .push(Notice::error(format!("Could not create \"{name}\": {}", err.message)));
                Err(err)
            }
        }
    }

    fn validate_move_to_folder(&self, item_id: ItemId, folder_id: ItemId) -> AppResult<Item> {
        if item_id == folder_id {
            return self.reject(
                item_id,
                Err(AppError::validation("An item cannot be moved into itself")),
            );
        }
        let item = self.known(item_id)?;
        if item.is_folder() {
            return self.reject(item_id, Err(AppError::conflict(NESTED_FOLDER_MESSAGE)));
        }
        if let Some(target) = self.snapshots.find(folder_id) {
            if !target.is_folder() {
                return self.reject(
                    item_id,
                    Err(AppError::validation(format!("\"{}\" is not a folder", target.name))),
                );
            }
        }
        Ok(item)
    }

    /// The item as shown locally; an item no open view shows cannot be
    /// mutated.
    fn known(&self, item_id: ItemId) -> AppResult<Item> {
        self.snapshots.find(item_id).ok_or_else(|| {
            let err = AppError::not_found(format!("Item {item_id} is not shown in any open view"));
            self.notify_rejection(Some(item_id), &err);
            err
        })
    }

    fn reject<T>(&self, item_id: ItemId, result: AppResult<T>) -> AppResult<T> {
        result.inspect_err(|e| self.notify_rejection(Some(item_id), e))
    }

    fn notify_rejection(&self, item_id: Option<ItemId>, err: &AppError) {
        let notice = Notice::error(err.message.clone());
        self.notices.push(match item_id {
            Some(id) => notice.for_item(id),
            None => notice,
        });
    }

    /// Shared apply, persist, then commit or roll back sequence.
    async fn optimistic<T, F>(&self, item: &Item, patch: LocalPatch, persist: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.optimistic_into(item, None, patch, persist).await
    }

    /// [`optimistic`](Self::optimistic) for calls that also name a target
    /// folder, which may be the missing side of a not-found failure.
    async fn optimistic_into<T, F>(
        &self,
        item: &Item,
        folder_id: Option<ItemId>,
        patch: LocalPatch,
        persist: F,
    ) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        // `persist` is lazy: nothing reaches the server before this patch.
        let token = self.snapshots.apply_optimistic(patch);

        match persist.await {
            Ok(value) => {
                self.snapshots.commit(token);
                Ok(value)
            }
            Err(err) if err.is_not_found() => {
                self.snapshots.rollback(token);
                self.discard_missing(item, folder_id).await;
                Err(err)
            }
            Err(err) => {
                self.snapshots.rollback(token);
                warn!(item_id = %item.id, error = %err, "Mutation failed, rolled back");
                self.notices.push(
                    Notice::error(format!("Could not update \"{}\": {}", item.name, err.message))
                        .for_item(item.id),
                );
                Err(err)
            }
        }
    }

    /// Drop whichever of `item` and `folder_id` the server no longer has.
    async fn discard_missing(&self, item: &Item, folder_id: Option<ItemId>) {
        if let Some(folder_id) = folder_id {
            let folder_gone = matches!(
                self.gateway.folder_items(folder_id).await,
                Err(ref e) if e.is_not_found()
            );
            if folder_gone {
                let name = self
                    .snapshots
                    .find(folder_id)
                    .map(|f| f.name)
                    .unwrap_or_else(|| format!("Folder {folder_id}"));
                self.snapshots.forget(folder_id);
                self.snapshots.close_view(ViewKey::Folder(folder_id));
                warn!(folder_id = %folder_id, "Folder no longer exists on the server");
                self.notices.push(
                    Notice::warning(format!("\"{name}\" is no longer available"))
                        .for_item(folder_id),
                );
                return;
            }
        }

        self.snapshots.forget(item.id);
        warn!(item_id = %item.id, "Item no longer exists on the server");
        self.notices.push(
            Notice::warning(format!("\"{}\" is no longer available", item.name)).for_item(item.id),
        );
    }
}
