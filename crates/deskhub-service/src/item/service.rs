//! Item CRUD and folder membership.

use std::sync::Arc;

use tracing::{debug, info, warn};

use deskhub_core::error::AppError;
use deskhub_core::events::{DomainEvent, ItemEvent, MembershipCount, MembershipScope};
use deskhub_core::result::AppResult;
use deskhub_core::traits::EventPublisher;
use deskhub_core::types::ItemId;
use deskhub_database::ItemRepository;
use deskhub_entity::{Dimensions, Item, ItemPatch, NewItem, Position};

use super::rules;

/// Manages items and their folder membership.
#[derive(Clone)]
pub struct ItemService {
    /// Item repository.
    repo: Arc<dyn ItemRepository>,
    /// Receives a change event after each successful mutation.
    events: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for ItemService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemService").finish_non_exhaustive()
    }
}

impl ItemService {
    /// Creates a new item service.
    pub fn new(repo: Arc<dyn ItemRepository>, events: Arc<dyn EventPublisher>) -> Self {
        Self { repo, events }
    }

    /// Lists every item.
    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        self.repo.find_all().await
    }

    /// Gets an item by id.
    pub async fn get_item(&self, id: ItemId) -> AppResult<Item> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))
    }

    /// Lists the contents of a folder.
    pub async fn list_folder(&self, folder_id: ItemId) -> AppResult<Vec<Item>> {
        self.require_folder(folder_id).await?;
        self.repo.find_children(folder_id).await
    }

    /// Number of items in a scope.
    pub async fn count_in(&self, scope: MembershipScope) -> AppResult<u64> {
        self.repo.count_in(scope).await
    }

    /// Creates a folder on the desktop.
    pub async fn create_folder(&self, name: &str, position: Position) -> AppResult<Item> {
        let name = rules::normalize_name(name)?;
        rules::check_position(position)?;

        let folder = self.repo.create(&NewItem::folder(name, position)).await?;
        info!(item_id = %folder.id, name = %folder.name, "Folder created");

        let affected = self.counts(&[MembershipScope::Desktop]).await;
        self.publish(ItemEvent::Created {
            item_id: folder.id,
            name: folder.name.clone(),
            affected,
        })
        .await;
        Ok(folder)
    }

    /// Moves an item on the desktop canvas.
    pub async fn update_position(&self, id: ItemId, position: Position) -> AppResult<Item> {
        rules::check_position(position)?;
        let item = self.patch(id, ItemPatch::Position(position)).await?;

        let affected = self.counts(&[MembershipScope::of_parent(item.parent_id)]).await;
        self.publish(ItemEvent::Repositioned {
            item_id: id,
            affected,
        })
        .await;
        Ok(item)
    }

    /// Resizes an item.
    pub async fn update_dimensions(&self, id: ItemId, dimensions: Dimensions) -> AppResult<Item> {
        rules::check_dimensions(dimensions)?;
        let item = self.patch(id, ItemPatch::Dimensions(dimensions)).await?;

        let affected = self.counts(&[MembershipScope::of_parent(item.parent_id)]).await;
        self.publish(ItemEvent::Resized {
            item_id: id,
            affected,
        })
        .await;
        Ok(item)
    }

    /// Renames an item.
    pub async fn rename(&self, id: ItemId, name: &str) -> AppResult<Item> {
        let name = rules::normalize_name(name)?;
        let item = self.patch(id, ItemPatch::Name(name)).await?;
        info!(item_id = %id, name = %item.name, "Item renamed");

        let affected = self.counts(&[MembershipScope::of_parent(item.parent_id)]).await;
        self.publish(ItemEvent::Renamed {
            item_id: id,
            name: item.name.clone(),
            affected,
        })
        .await;
        Ok(item)
    }

    /// Puts an item into a folder.
    ///
    /// Adding an item that is already in the folder succeeds without
    /// changing anything.
    pub async fn add_to_folder(&self, folder_id: ItemId, item_id: ItemId) -> AppResult<Item> {
        if folder_id == item_id {
            return Err(AppError::validation("An item cannot be moved into itself"));
        }
        self.require_folder(folder_id).await?;
        let item = self.get_item(item_id).await?;
        if item.is_folder() {
            return Err(AppError::conflict("folders cannot be nested"));
        }
        if item.parent_id == Some(folder_id) {
            debug!(item_id = %item_id, folder_id = %folder_id, "Item already in folder");
            return Ok(item);
        }

        let from = item.parent_id;
        let moved = self.patch(item_id, ItemPatch::EnterFolder { folder_id }).await?;
        info!(item_id = %item_id, folder_id = %folder_id, "Item moved into folder");

        let affected = self
            .counts(&[
                MembershipScope::of_parent(from),
                MembershipScope::Folder { folder_id },
            ])
            .await;
        self.publish(ItemEvent::Moved {
            item_id,
            from_folder_id: from,
            to_folder_id: Some(folder_id),
            affected,
        })
        .await;
        Ok(moved)
    }

    /// Takes an item out of its folder, optionally placing it on the
    /// desktop. An item already on the desktop is only repositioned.
    pub async fn remove_from_folder(
        &self,
        item_id: ItemId,
        position: Option<Position>,
    ) -> AppResult<Item> {
        if let Some(position) = position {
            rules::check_position(position)?;
        }
        let item = self.get_item(item_id).await?;
        let Some(from) = item.parent_id else {
            return match position {
                Some(position) => self.update_position(item_id, position).await,
                None => Ok(item),
            };
        };

        let moved = self
            .patch(item_id, ItemPatch::LeaveFolder { position })
            .await?;
        info!(item_id = %item_id, folder_id = %from, "Item moved to desktop");

        let affected = self
            .counts(&[
                MembershipScope::Folder { folder_id: from },
                MembershipScope::Desktop,
            ])
            .await;
        self.publish(ItemEvent::Moved {
            item_id,
            from_folder_id: Some(from),
            to_folder_id: None,
            affected,
        })
        .await;
        Ok(moved)
    }

    /// Deletes an item. Deleting a folder releases its contents to the
    /// desktop.
    pub async fn delete(&self, id: ItemId) -> AppResult<()> {
        let item = self.get_item(id).await?;
        let mut scopes = vec![MembershipScope::of_parent(item.parent_id)];

        if item.is_folder() {
            let released = self.repo.release_children(id).await?;
            if released > 0 {
                info!(folder_id = %id, released, "Released folder contents to desktop");
            }
            scopes.push(MembershipScope::Desktop);
            scopes.push(MembershipScope::Folder { folder_id: id });
        }

        self.repo
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))?;
        info!(item_id = %id, "Item deleted");

        let affected = self.counts(&scopes).await;
        self.publish(ItemEvent::Deleted {
            item_id: id,
            affected,
        })
        .await;
        Ok(())
    }

    async fn require_folder(&self, folder_id: ItemId) -> AppResult<Item> {
        let folder = self.get_item(folder_id).await?;
        if !folder.is_folder() {
            return Err(AppError::validation(format!(
                "Item {folder_id} is not a folder"
            )));
        }
        Ok(folder)
    }

    async fn patch(&self, id: ItemId, patch: ItemPatch) -> AppResult<Item> {
        self.repo
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))
    }

    /// Current counts for the scopes a committed mutation touched. The
    /// change is already persisted, so a scope whose count cannot be read
    /// is left out of the broadcast instead of failing the call.
    async fn counts(&self, scopes: &[MembershipScope]) -> Vec<MembershipCount> {
        let mut counts: Vec<MembershipCount> = Vec::with_capacity(scopes.len());
        for scope in scopes {
            if counts.iter().any(|c| c.scope == *scope) {
                continue;
            }
            match self.repo.count_in(*scope).await {
                Ok(item_count) => counts.push(MembershipCount {
                    scope: *scope,
                    item_count,
                }),
                Err(e) => warn!(?scope, error = %e, "Failed to count items for broadcast"),
            }
        }
        counts
    }

    async fn publish(&self, event: ItemEvent) {
        self.events.publish(DomainEvent::item(event)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use deskhub_core::error::ErrorKind;
    use deskhub_database::MemoryItemRepository;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<DomainEvent>>,
    }

    impl RecordingPublisher {
        fn taken(&self) -> Vec<DomainEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, event: DomainEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    async fn setup() -> (ItemService, Arc<MemoryItemRepository>, Arc<RecordingPublisher>) {
        let repo = Arc::new(MemoryItemRepository::new());
        let events = Arc::new(RecordingPublisher::default());
        let service = ItemService::new(repo.clone(), events.clone());
        (service, repo, events)
    }

    /// Delegates to the memory repository but cannot count.
    struct UncountableRepo(MemoryItemRepository);

    #[async_trait]
    impl ItemRepository for UncountableRepo {
        async fn find_all(&self) -> AppResult<Vec<Item>> {
            self.0.find_all().await
        }

        async fn find_by_id(&self, id: ItemId) -> AppResult<Option<Item>> {
            self.0.find_by_id(id).await
        }

        async fn find_children(&self, folder_id: ItemId) -> AppResult<Vec<Item>> {
            self.0.find_children(folder_id).await
        }

        async fn count_in(&self, _scope: MembershipScope) -> AppResult<u64> {
            Err(AppError::database("connection reset"))
        }

        async fn create(&self, item: &NewItem) -> AppResult<Item> {
            self.0.create(item).await
        }

        async fn update(&self, id: ItemId, patch: &ItemPatch) -> AppResult<Option<Item>> {
            self.0.update(id, patch).await
        }

        async fn delete(&self, id: ItemId) -> AppResult<Option<Item>> {
            self.0.delete(id).await
        }

        async fn release_children(&self, folder_id: ItemId) -> AppResult<u64> {
            self.0.release_children(folder_id).await
        }
    }

    #[tokio::test]
    async fn test_committed_move_succeeds_when_counting_fails() {
        let repo = Arc::new(UncountableRepo(MemoryItemRepository::new()));
        let events = Arc::new(RecordingPublisher::default());
        let service = ItemService::new(repo.clone(), events.clone());
        let file = repo
            .create(&NewItem::file("a.txt", Position::new(50, 50)))
            .await
            .unwrap();
        let folder = service.create_folder("Docs", Position::new(10, 10)).await.unwrap();
        events.taken();

        let moved = service.add_to_folder(folder.id, file.id).await.unwrap();
        assert_eq!(moved.parent_id, Some(folder.id));
        assert_eq!(service.list_folder(folder.id).await.unwrap(), vec![moved]);

        let published = events.taken();
        assert_eq!(published.len(), 1);
        assert!(published[0].affected().is_empty());

        service.remove_from_folder(file.id, None).await.unwrap();
        service.delete(folder.id).await.unwrap();
        assert_eq!(service.list_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_to_folder_publishes_counts() {
        let (service, repo, events) = setup().await;
        let file = repo
            .create(&NewItem::file("a.txt", Position::new(50, 50)))
            .await
            .unwrap();
        let folder = service.create_folder("Docs", Position::new(10, 10)).await.unwrap();
        events.taken();

        let moved = service.add_to_folder(folder.id, file.id).await.unwrap();
        assert_eq!(moved.parent_id, Some(folder.id));

        let published = events.taken();
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].affected(),
            &[
                MembershipCount {
                    scope: MembershipScope::Desktop,
                    item_count: 1,
                },
                MembershipCount {
                    scope: MembershipScope::Folder {
                        folder_id: folder.id
                    },
                    item_count: 1,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_add_to_folder_is_idempotent() {
        let (service, repo, events) = setup().await;
        let folder = service.create_folder("Docs", Position::new(0, 0)).await.unwrap();
        let file = repo
            .create(&NewItem::file("a", Position::new(1, 1)))
            .await
            .unwrap();

        service.add_to_folder(folder.id, file.id).await.unwrap();
        events.taken();
        service.add_to_folder(folder.id, file.id).await.unwrap();

        assert!(events.taken().is_empty());
        assert_eq!(service.list_folder(folder.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_folder_into_folder_is_a_conflict() {
        let (service, _, _) = setup().await;
        let a = service.create_folder("A", Position::new(0, 0)).await.unwrap();
        let b = service.create_folder("B", Position::new(0, 0)).await.unwrap();

        let err = service.add_to_folder(b.id, a.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_invalid_targets() {
        let (service, repo, _) = setup().await;
        let folder = service.create_folder("F", Position::new(0, 0)).await.unwrap();
        let file = repo
            .create(&NewItem::file("x", Position::new(0, 0)))
            .await
            .unwrap();

        let err = service.add_to_folder(folder.id, folder.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = service.add_to_folder(file.id, folder.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = service.add_to_folder(ItemId(404), file.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_remove_from_folder_places_item() {
        let (service, repo, _) = setup().await;
        let folder = service.create_folder("F", Position::new(0, 0)).await.unwrap();
        let file = repo
            .create(&NewItem::file("x", Position::new(5, 5)).in_folder(folder.id))
            .await
            .unwrap();

        let out = service
            .remove_from_folder(file.id, Some(Position::new(120, 80)))
            .await
            .unwrap();
        assert_eq!(out.parent_id, None);
        assert_eq!(out.position, Position::new(120, 80));
        assert!(service.list_folder(folder.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_folder_releases_children() {
        let (service, repo, events) = setup().await;
        let folder = service.create_folder("F", Position::new(0, 0)).await.unwrap();
        let file = repo
            .create(&NewItem::file("x", Position::new(5, 5)).in_folder(folder.id))
            .await
            .unwrap();
        events.taken();

        service.delete(folder.id).await.unwrap();

        let survivor = service.get_item(file.id).await.unwrap();
        assert!(survivor.is_on_desktop());
        let published = events.taken();
        assert!(published[0].affected().contains(&MembershipCount {
            scope: MembershipScope::Folder {
                folder_id: folder.id
            },
            item_count: 0,
        }));
    }

    #[tokio::test]
    async fn test_validation_runs_before_lookup() {
        let (service, _, _) = setup().await;
        let err = service
            .update_dimensions(ItemId(1), Dimensions::new(0, 10))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = service.rename(ItemId(1), "ok").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
