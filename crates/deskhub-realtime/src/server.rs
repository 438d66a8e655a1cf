//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use deskhub_core::config::RealtimeConfig;

use crate::bridge::event_bridge::EventBridge;
use crate::channel::registry::ChannelRegistry;
use crate::connection::manager::ConnectionManager;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Folder subscriptions.
    pub channels: Arc<ChannelRegistry>,
    /// Event bridge (domain events → broadcasts).
    pub event_bridge: Arc<EventBridge>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let channels = Arc::new(ChannelRegistry::new());
        let connections = Arc::new(ConnectionManager::new(config, channels.clone()));
        let event_bridge = Arc::new(EventBridge::new(connections.clone()));

        info!("Real-time engine initialized");

        Self {
            connections,
            channels,
            event_bridge,
            shutdown_tx,
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals every connection task to stop and drops all connections.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
    }
}
