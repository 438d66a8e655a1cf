//! Inbound and outbound WebSocket message type definitions.
//!
//! Every frame is a JSON object with a `type` discriminator; field names
//! are camelCase.

use serde::{Deserialize, Serialize};

use deskhub_core::types::ItemId;
use deskhub_entity::Item;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    /// Ask for the authoritative contents of a folder.
    RequestFolderRefresh {
        /// Folder ID.
        folder_id: ItemId,
    },
    /// Note interest in a folder.
    Subscribe {
        /// Folder ID.
        folder_id: ItemId,
    },
    /// Drop interest in a folder.
    Unsubscribe {
        /// Folder ID.
        folder_id: ItemId,
    },
    /// Reply to a server ping.
    Pong {
        /// Echoed timestamp, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    /// Answer to `requestFolderRefresh`.
    FolderContents {
        /// Folder ID.
        folder_id: ItemId,
        /// Full membership of the folder.
        items: Vec<Item>,
    },
    /// A folder's contents changed. Carries no item detail.
    MembershipChanged {
        /// Folder ID.
        folder_id: ItemId,
        /// Number of items in the folder now.
        item_count: u64,
    },
    /// The set of desktop items changed.
    DesktopChanged {
        /// Number of desktop items now.
        item_count: u64,
    },
    /// Keepalive.
    Ping {
        /// Server timestamp in milliseconds.
        #[serde(default)]
        timestamp: i64,
    },
    /// A frame could not be handled.
    Error {
        /// Machine-readable error code.
        code: String,
        /// Human-readable description.
        message: String,
        /// Folder the failed request was about, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        folder_id: Option<ItemId>,
    },
}

impl OutboundMessage {
    /// Build an error frame.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
            folder_id: None,
        }
    }
}
