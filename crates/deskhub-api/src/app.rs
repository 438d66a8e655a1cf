//! Application builder: wires router, middleware, and state into an Axum
//! app, and runs the server.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use deskhub_core::config::AppConfig;
use deskhub_core::error::AppError;
use deskhub_database::migration::run_migrations;
use deskhub_database::{DatabasePool, ItemRepository, MemoryItemRepository, PgItemRepository};

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(build_compression_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Chooses the item repository: PostgreSQL when `database.url` is set,
/// otherwise in memory.
pub async fn open_repository(config: &AppConfig) -> Result<Arc<dyn ItemRepository>, AppError> {
    if !config.database.is_postgres() {
        info!("No database URL configured, keeping items in memory");
        return Ok(Arc::new(MemoryItemRepository::new()));
    }

    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;
    Ok(Arc::new(PgItemRepository::new(db.pool().clone())))
}

/// Runs the Deskhub server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting Deskhub server...");

    let repo = open_repository(&config).await?;
    let addr = config.server.bind_address();
    let state = AppState::new(config, repo);
    let realtime = state.realtime.clone();

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, "Deskhub server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            realtime.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Deskhub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
