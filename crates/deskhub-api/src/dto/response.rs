//! Response DTOs.

use serde::{Deserialize, Serialize};

use deskhub_entity::Item;

/// `{ "items": [...] }` list body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse {
    /// The listed items.
    pub items: Vec<Item>,
}

impl From<Vec<Item>> for ItemsResponse {
    fn from(items: Vec<Item>) -> Self {
        Self { items }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Open sync channel connections.
    pub ws_connections: usize,
}
