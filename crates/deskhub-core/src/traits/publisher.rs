//! Sink for domain events.

use async_trait::async_trait;

use crate::events::DomainEvent;

/// Receives domain events after a mutation has been persisted.
///
/// Publishing is best-effort: implementations log delivery problems
/// instead of failing the mutation that produced the event.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish an event to all interested parties.
    async fn publish(&self, event: DomainEvent);
}

/// Publisher that drops every event. Used when no real-time engine runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: DomainEvent) {
        tracing::trace!(event_id = %event.id, "Dropping event (no publisher)");
    }
}
