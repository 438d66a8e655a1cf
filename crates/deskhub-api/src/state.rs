//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use deskhub_core::config::AppConfig;
use deskhub_database::ItemRepository;
use deskhub_realtime::RealtimeEngine;
use deskhub_service::ItemService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
    /// Item service
    pub item_service: Arc<ItemService>,
}

impl AppState {
    /// Wire the realtime engine and the item service around a repository.
    ///
    /// The service publishes its change events through the engine's event
    /// bridge.
    pub fn new(config: AppConfig, repo: Arc<dyn ItemRepository>) -> Self {
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone()));
        let item_service = Arc::new(ItemService::new(repo, realtime.event_bridge.clone()));

        Self {
            config: Arc::new(config),
            realtime,
            item_service,
        }
    }
}
