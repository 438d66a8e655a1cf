//! Folder subscriptions.

pub mod registry;
pub mod subscription;

pub use registry::ChannelRegistry;
