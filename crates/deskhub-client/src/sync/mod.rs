//! Keeping open views converged with the server.
//!
//! The [`LiveSyncChannel`] holds a persistent connection, answers
//! `membershipChanged` pushes by re-requesting the folder, and falls back
//! to HTTP when a refresh goes unanswered. The [`FallbackPoller`] refreshes
//! open views on a fixed interval while the channel is down or a view's
//! last refresh timed out. Both only ever replace whole snapshots, so they
//! can overlap freely.

pub mod channel;
pub mod connector;
pub mod poller;
pub mod refresher;
pub mod status;

pub use channel::LiveSyncChannel;
pub use connector::{Connection, Connector, WsConnector};
pub use poller::FallbackPoller;
pub use refresher::Refresher;
pub use status::{ChannelState, SyncStatus};
