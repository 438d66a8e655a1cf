//! Bridges domain events into sync channel broadcasts.

pub mod event_bridge;

pub use event_bridge::EventBridge;
