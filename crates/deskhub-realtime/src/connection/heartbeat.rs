//! Ping/activity heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use deskhub_core::config::RealtimeConfig;

use crate::message::types::OutboundMessage;

use super::handle::ConnectionHandle;

/// Shortest accepted ping interval.
const MIN_PING_INTERVAL: Duration = Duration::from_secs(1);

/// Heartbeat configuration
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Extra grace after a ping before the connection counts as dead
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

/// Run the heartbeat loop for a connection.
///
/// Sends a ping every interval. Any inbound frame counts as activity; a
/// connection silent for longer than interval + timeout is marked dead and
/// the loop ends.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval.max(MIN_PING_INTERVAL));
    interval.tick().await;
    let limit = (config.ping_interval + config.ping_timeout).as_millis() as i64;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let idle = handle.idle_millis();
        if idle > limit {
            tracing::warn!(conn_id = %handle.id, idle_ms = idle, "Heartbeat timeout");
            handle.mark_dead();
            break;
        }

        let ping = OutboundMessage::Ping {
            timestamp: Utc::now().timestamp_millis(),
        };
        let frame = match serde_json::to_string(&ping) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize ping");
                continue;
            }
        };
        if !handle.send(frame) && !handle.is_alive() {
            tracing::debug!(conn_id = %handle.id, "Ping send failed, connection closed");
            break;
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat loop ended");
}
