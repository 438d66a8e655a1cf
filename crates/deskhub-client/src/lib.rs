//! # deskhub-client
//!
//! Client core for the Deskhub virtual desktop.
//!
//! A drag starts in the [`DragController`](drag::DragController), which asks
//! the [`DropTargetResolver`](target::DropTargetResolver) for the hovered
//! region on every pointer move. On release the
//! [`FolderMembershipMutator`](mutator::FolderMembershipMutator) patches the
//! [`SnapshotStore`](snapshot::SnapshotStore) optimistically, persists the
//! change through an [`ItemGateway`](gateway::ItemGateway), and commits or
//! rolls back. The [`LiveSyncChannel`](sync::LiveSyncChannel) and the
//! [`FallbackPoller`](sync::FallbackPoller) keep every open view converged
//! with the server. [`Desktop`](desktop::Desktop) wires the pieces together.

pub mod desktop;
pub mod drag;
pub mod error;
pub mod gateway;
pub mod geometry;
pub mod mutator;
pub mod notice;
pub mod snapshot;
pub mod sync;
pub mod target;
pub mod views;

pub use desktop::{Desktop, DropReport};
pub use drag::{DragController, DragOutcome, DragPhase};
pub use error::DragError;
pub use gateway::{HttpGateway, ItemGateway};
pub use geometry::Rect;
pub use mutator::FolderMembershipMutator;
pub use notice::{Notice, NoticeLevel};
pub use snapshot::{LocalPatch, SnapshotStore, ViewKey};
pub use sync::{ChannelState, FallbackPoller, LiveSyncChannel};
pub use target::{DropTarget, DropTargetResolver, Resolution, TargetPriority};
pub use views::{ViewOpen, ViewRegistry};
