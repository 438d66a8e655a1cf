//! Connection manager: connection lifecycle and message routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use deskhub_core::config::RealtimeConfig;
use deskhub_core::error::ErrorKind;
use deskhub_core::types::ItemId;

use crate::channel::registry::ChannelRegistry;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::source::FolderContentsSource;

use super::handle::{ConnectionHandle, ConnectionId};
use super::heartbeat::HeartbeatConfig;
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Folder subscriptions.
    channels: Arc<ChannelRegistry>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig, channels: Arc<ChannelRegistry>) -> Self {
        Self {
            pool: ConnectionPool::new(),
            channels,
            config,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns the connection handle and a receiver for outbound frames.
    pub fn register(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(tx));
        self.pool.add(handle.clone());

        info!(
            conn_id = %handle.id,
            total = self.pool.connection_count(),
            "WebSocket connection registered"
        );
        (handle, rx)
    }

    /// Unregisters a connection and cleans up subscriptions.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            self.channels.unsubscribe_all(*conn_id);
            info!(conn_id = %conn_id, "WebSocket connection unregistered");
        }
    }

    /// Processes an inbound frame from a client.
    pub async fn handle_inbound(
        &self,
        conn_id: &ConnectionId,
        raw_message: &str,
        source: &dyn FolderContentsSource,
    ) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        handle.touch();

        let msg: InboundMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "Malformed frame");
                self.send(
                    &handle,
                    &OutboundMessage::error(
                        "INVALID_MESSAGE",
                        format!("Failed to parse message: {e}"),
                    ),
                );
                return;
            }
        };

        match msg {
            InboundMessage::RequestFolderRefresh { folder_id } => {
                self.handle_refresh(&handle, folder_id, source).await;
            }
            InboundMessage::Subscribe { folder_id } => {
                self.handle_subscribe(&handle, folder_id);
            }
            InboundMessage::Unsubscribe { folder_id } => {
                self.channels.unsubscribe(folder_id, handle.id);
                debug!(conn_id = %conn_id, folder_id = %folder_id, "Unsubscribed from folder");
            }
            InboundMessage::Pong { .. } => {}
        }
    }

    async fn handle_refresh(
        &self,
        handle: &ConnectionHandle,
        folder_id: ItemId,
        source: &dyn FolderContentsSource,
    ) {
        let reply = match source.folder_contents(folder_id).await {
            Ok(items) => {
                debug!(
                    conn_id = %handle.id,
                    folder_id = %folder_id,
                    count = items.len(),
                    "Answering folder refresh"
                );
                OutboundMessage::FolderContents { folder_id, items }
            }
            Err(e) => {
                let code = match e.kind {
                    ErrorKind::NotFound => "NOT_FOUND",
                    ErrorKind::Validation => "VALIDATION_ERROR",
                    _ => {
                        error!(folder_id = %folder_id, error = %e, "Folder refresh failed");
                        "INTERNAL_ERROR"
                    }
                };
                OutboundMessage::Error {
                    code: code.to_string(),
                    message: e.message,
                    folder_id: Some(folder_id),
                }
            }
        };
        self.send(handle, &reply);
    }

    fn handle_subscribe(&self, handle: &ConnectionHandle, folder_id: ItemId) {
        let current = self.channels.subscription_count(handle.id);
        if current >= self.config.max_subscriptions_per_connection {
            self.send(
                handle,
                &OutboundMessage::error(
                    "MAX_SUBSCRIPTIONS",
                    format!(
                        "Maximum subscriptions ({}) reached",
                        self.config.max_subscriptions_per_connection
                    ),
                ),
            );
            return;
        }

        if self.channels.subscribe(folder_id, handle.id) {
            debug!(conn_id = %handle.id, folder_id = %folder_id, "Subscribed to folder");
        }
    }

    /// Sends a message to one connection.
    pub fn send(&self, handle: &ConnectionHandle, message: &OutboundMessage) -> bool {
        match serde_json::to_string(message) {
            Ok(frame) => handle.send(frame),
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound message");
                false
            }
        }
    }

    /// Broadcasts a message to all connected clients. Returns how many
    /// connections accepted it.
    pub fn broadcast_all(&self, message: &OutboundMessage) -> usize {
        let frame = match serde_json::to_string(message) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "Failed to serialize broadcast message");
                return 0;
            }
        };

        self.pool
            .all_connections()
            .iter()
            .filter(|conn| conn.send(frame.clone()))
            .count()
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.mark_dead();
            self.pool.remove(&conn.id);
            self.channels.unsubscribe_all(conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Heartbeat settings for new connections.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }
}
