//! Domain event → broadcast mapping.
//!
//! Every affected scope of an item event becomes one dirty-flag frame sent
//! to all connections: `membershipChanged` for folders, `desktopChanged`
//! for the desktop. Frames carry no item detail; clients refetch.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use deskhub_core::events::{DomainEvent, MembershipCount, MembershipScope};
use deskhub_core::traits::EventPublisher;

use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundMessage;

/// Bridges domain events into the realtime system.
#[derive(Debug)]
pub struct EventBridge {
    connections: Arc<ConnectionManager>,
}

impl EventBridge {
    /// Create a new event bridge
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// The frame announcing a scope change.
    pub fn frame_for(count: &MembershipCount) -> OutboundMessage {
        match count.scope {
            MembershipScope::Desktop => OutboundMessage::DesktopChanged {
                item_count: count.item_count,
            },
            MembershipScope::Folder { folder_id } => OutboundMessage::MembershipChanged {
                folder_id,
                item_count: count.item_count,
            },
        }
    }
}

#[async_trait]
impl EventPublisher for EventBridge {
    async fn publish(&self, event: DomainEvent) {
        for count in event.affected() {
            let delivered = self.connections.broadcast_all(&Self::frame_for(count));
            debug!(
                event_id = %event.id,
                scope = ?count.scope,
                item_count = count.item_count,
                delivered,
                "Broadcast membership change"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use deskhub_core::config::RealtimeConfig;
    use deskhub_core::events::ItemEvent;
    use deskhub_core::types::ItemId;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::channel::ChannelRegistry;

    #[tokio::test]
    async fn test_move_broadcasts_both_scopes() {
        let connections = Arc::new(ConnectionManager::new(
            RealtimeConfig::default(),
            Arc::new(ChannelRegistry::new()),
        ));
        let bridge = EventBridge::new(connections.clone());
        let (_handle, mut rx) = connections.register();

        bridge
            .publish(DomainEvent::item(ItemEvent::Moved {
                item_id: ItemId(1),
                from_folder_id: None,
                to_folder_id: Some(ItemId(2)),
                affected: vec![
                    MembershipCount {
                        scope: MembershipScope::Desktop,
                        item_count: 3,
                    },
                    MembershipCount {
                        scope: MembershipScope::Folder {
                            folder_id: ItemId(2),
                        },
                        item_count: 1,
                    },
                ],
            }))
            .await;

        let first: OutboundMessage = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        let second: OutboundMessage = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(first, OutboundMessage::DesktopChanged { item_count: 3 });
        assert_eq!(
            second,
            OutboundMessage::MembershipChanged {
                folder_id: ItemId(2),
                item_count: 1
            }
        );
    }
}
