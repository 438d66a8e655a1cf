//! Route definitions for the Deskhub HTTP API.

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::{delete, get, patch, post};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with every route and the request logger.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(item_routes())
        .merge(folder_routes())
        .route("/health", get(handlers::health::health))
        .route("/ws", get(handlers::ws::ws_upgrade))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Item listing and single-field updates
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(handlers::item::list_items))
        .route("/items/{id}", delete(handlers::item::delete_item))
        .route(
            "/items/{id}/position",
            patch(handlers::item::update_position),
        )
        .route(
            "/items/{id}/dimensions",
            patch(handlers::item::update_dimensions),
        )
        .route("/items/{id}/name", patch(handlers::item::rename))
}

/// Folder creation, contents, and membership
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(handlers::folder::create_folder))
        .route(
            "/folders/{folder_id}/items",
            get(handlers::folder::list_folder),
        )
        .route(
            "/folders/{folder_id}/items/{item_id}",
            post(handlers::folder::add_to_folder),
        )
        .route(
            "/folders/items/{item_id}",
            delete(handlers::folder::remove_from_folder),
        )
}
