//! Sync channel wire protocol.

pub mod types;

pub use types::{InboundMessage, OutboundMessage};
