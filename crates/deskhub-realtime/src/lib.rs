//! # deskhub-realtime
//!
//! Real-time WebSocket engine for Deskhub. Provides:
//!
//! - Connection management with a per-connection outbound queue
//! - Folder subscriptions (bookkeeping only; broadcasts go to everyone)
//! - `requestFolderRefresh` handling backed by a [`FolderContentsSource`]
//! - Membership-changed broadcasts bridged from domain events
//! - Ping/activity heartbeat

pub mod bridge;
pub mod channel;
pub mod connection;
pub mod message;
pub mod server;
pub mod source;

pub use bridge::EventBridge;
pub use channel::ChannelRegistry;
pub use connection::ConnectionManager;
pub use message::{InboundMessage, OutboundMessage};
pub use server::RealtimeEngine;
pub use source::FolderContentsSource;
