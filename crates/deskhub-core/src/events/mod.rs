//! Domain events emitted by Deskhub operations.
//!
//! Events are handed to an [`EventPublisher`](crate::traits::EventPublisher)
//! and consumed by the real-time engine, which turns them into
//! membership-changed notifications for connected clients.

pub mod item;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use item::{ItemEvent, MembershipCount, MembershipScope};

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// An item-related event.
    Item(ItemEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Wrap an item event.
    pub fn item(event: ItemEvent) -> Self {
        Self::new(EventPayload::Item(event))
    }

    /// Membership scopes whose contents changed, with their new sizes.
    pub fn affected(&self) -> &[MembershipCount] {
        match &self.payload {
            EventPayload::Item(event) => event.affected(),
        }
    }
}
