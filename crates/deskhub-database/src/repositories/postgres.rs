//! PostgreSQL item repository.

use async_trait::async_trait;
use sqlx::PgPool;

use deskhub_core::error::{AppError, ErrorKind};
use deskhub_core::events::MembershipScope;
use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_entity::{Item, ItemPatch, NewItem};

use super::ItemRepository;

macro_rules! item_columns {
    () => {
        "id, name, kind, size_bytes, mime_type, content_ref, \
         pos_x, pos_y, width, height, parent_id"
    };
}

/// Item repository backed by the `items` table.
#[derive(Debug, Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    /// Create a new item repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn find_all(&self) -> AppResult<Vec<Item>> {
        sqlx::query_as::<_, Item>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM items ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list items"))
    }

    async fn find_by_id(&self, id: ItemId) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find item"))
    }

    async fn find_children(&self, folder_id: ItemId) -> AppResult<Vec<Item>> {
        sqlx::query_as::<_, Item>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM items WHERE parent_id = $1 ORDER BY id"
        ))
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list folder contents"))
    }

    async fn count_in(&self, scope: MembershipScope) -> AppResult<u64> {
        let count: i64 = match scope {
            MembershipScope::Desktop => {
                sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE parent_id IS NULL")
                    .fetch_one(&self.pool)
                    .await
            }
            MembershipScope::Folder { folder_id } => {
                sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE parent_id = $1")
                    .bind(folder_id)
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(db_error("Failed to count items"))?;

        Ok(count.max(0) as u64)
    }

    async fn create(&self, item: &NewItem) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(concat!(
            "INSERT INTO items (name, kind, size_bytes, mime_type, content_ref, \
             pos_x, pos_y, width, height, parent_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING ",
            item_columns!()
        ))
        .bind(&item.name)
        .bind(item.kind)
        .bind(item.size)
        .bind(&item.mime_type)
        .bind(&item.content_ref)
        .bind(item.position.x)
        .bind(item.position.y)
        .bind(item.dimensions.map(|d| d.width))
        .bind(item.dimensions.map(|d| d.height))
        .bind(item.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create item"))
    }

    async fn update(&self, id: ItemId, patch: &ItemPatch) -> AppResult<Option<Item>> {
        let query = match patch {
            ItemPatch::Position(position) => sqlx::query_as::<_, Item>(concat!(
                "UPDATE items SET pos_x = $2, pos_y = $3, updated_at = NOW() \
                 WHERE id = $1 RETURNING ",
                item_columns!()
            ))
            .bind(id)
            .bind(position.x)
            .bind(position.y),
            ItemPatch::Dimensions(dimensions) => sqlx::query_as::<_, Item>(concat!(
                "UPDATE items SET width = $2, height = $3, updated_at = NOW() \
                 WHERE id = $1 RETURNING ",
                item_columns!()
            ))
            .bind(id)
            .bind(dimensions.width)
            .bind(dimensions.height),
            ItemPatch::Name(name) => sqlx::query_as::<_, Item>(concat!(
                "UPDATE items SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING ",
                item_columns!()
            ))
            .bind(id)
            .bind(name.as_str()),
            ItemPatch::EnterFolder { folder_id } => sqlx::query_as::<_, Item>(concat!(
                "UPDATE items SET parent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING ",
                item_columns!()
            ))
            .bind(id)
            .bind(*folder_id),
            ItemPatch::LeaveFolder { position } => sqlx::query_as::<_, Item>(concat!(
                "UPDATE items SET parent_id = NULL, \
                 pos_x = COALESCE($2, pos_x), pos_y = COALESCE($3, pos_y), \
                 updated_at = NOW() WHERE id = $1 RETURNING ",
                item_columns!()
            ))
            .bind(id)
            .bind(position.map(|p| p.x))
            .bind(position.map(|p| p.y)),
        };

        query
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to update item"))
    }

    async fn delete(&self, id: ItemId) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>(concat!(
            "DELETE FROM items WHERE id = $1 RETURNING ",
            item_columns!()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to delete item"))
    }

    async fn release_children(&self, folder_id: ItemId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE items SET parent_id = NULL, updated_at = NOW() WHERE parent_id = $1",
        )
        .bind(folder_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to release folder contents"))?;

        Ok(result.rows_affected())
    }
}
