//! Desktop client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the desktop client: HTTP/WebSocket endpoints, the
/// click-versus-drag threshold, and live-sync timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the HTTP API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// URL of the sync channel endpoint.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Pointer displacement (px) above which a press becomes a drag.
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold_px: i32,
    /// Delay before re-establishing a dropped sync channel.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// How long a channel refresh may stay unanswered before HTTP is used.
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout_ms: u64,
    /// Fallback polling interval for open views.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// HTTP request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl ClientConfig {
    /// Reconnect delay as a [`Duration`].
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Refresh timeout as a [`Duration`].
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// HTTP request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            drag_threshold_px: default_drag_threshold(),
            reconnect_delay_ms: default_reconnect_delay(),
            refresh_timeout_ms: default_refresh_timeout(),
            poll_interval_ms: default_poll_interval(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_ws_url() -> String {
    "ws://127.0.0.1:8080/ws".to_string()
}

fn default_drag_threshold() -> i32 {
    2
}

fn default_reconnect_delay() -> u64 {
    3000
}

fn default_refresh_timeout() -> u64 {
    3000
}

fn default_poll_interval() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    10_000
}
