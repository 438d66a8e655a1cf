//! Item listing and single-field updates.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use deskhub_core::types::ItemId;
use deskhub_entity::Item;

use crate::dto::request::{DimensionsRequest, PositionRequest, RenameRequest};
use crate::dto::response::ItemsResponse;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// GET /items
pub async fn list_items(State(state): State<AppState>) -> Result<Json<ItemsResponse>, ApiError> {
    let items = state.item_service.list_items().await?;
    Ok(Json(items.into()))
}

/// PATCH /items/{id}/position
pub async fn update_position(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    ValidatedJson(req): ValidatedJson<PositionRequest>,
) -> Result<Json<Item>, ApiError> {
    let item = state.item_service.update_position(id, req.into()).await?;
    Ok(Json(item))
}

/// PATCH /items/{id}/dimensions
pub async fn update_dimensions(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    ValidatedJson(req): ValidatedJson<DimensionsRequest>,
) -> Result<Json<Item>, ApiError> {
    let item = state.item_service.update_dimensions(id, req.into()).await?;
    Ok(Json(item))
}

/// PATCH /items/{id}/name
pub async fn rename(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    ValidatedJson(req): ValidatedJson<RenameRequest>,
) -> Result<Json<Item>, ApiError> {
    let item = state.item_service.rename(id, &req.name).await?;
    Ok(Json(item))
}

/// DELETE /items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<StatusCode, ApiError> {
    state.item_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
