//! Folder contents and membership handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use deskhub_core::types::ItemId;
use deskhub_entity::{Item, Position};

use crate::dto::request::{CreateFolderRequest, RemoveFromFolderRequest};
use crate::dto::response::ItemsResponse;
use crate::error::ApiError;
use crate::extractors::{OptionalJson, ValidatedJson};
use crate::state::AppState;

/// GET /folders/{folder_id}/items
pub async fn list_folder(
    State(state): State<AppState>,
    Path(folder_id): Path<ItemId>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let items = state.item_service.list_folder(folder_id).await?;
    Ok(Json(items.into()))
}

/// POST /folders
pub async fn create_folder(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let position = req.position.map(Position::from).unwrap_or_default();
    let folder = state.item_service.create_folder(&req.name, position).await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// POST /folders/{folder_id}/items/{item_id}
pub async fn add_to_folder(
    State(state): State<AppState>,
    Path((folder_id, item_id)): Path<(ItemId, ItemId)>,
) -> Result<Json<Item>, ApiError> {
    let item = state.item_service.add_to_folder(folder_id, item_id).await?;
    Ok(Json(item))
}

/// DELETE /folders/items/{item_id}
pub async fn remove_from_folder(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    OptionalJson(req): OptionalJson<RemoveFromFolderRequest>,
) -> Result<Json<Item>, ApiError> {
    let position = req.and_then(|r| r.position).map(Position::from);
    let item = state
        .item_service
        .remove_from_folder(item_id, position)
        .await?;
    Ok(Json(item))
}
