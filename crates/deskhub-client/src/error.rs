//! Drag gesture errors.
//!
//! Mutation failures use [`AppError`](deskhub_core::AppError); these cover
//! gestures the controller refuses to start.

use deskhub_core::types::ItemId;
use thiserror::Error;

/// Why a drag could not begin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    /// Another drag session is still alive.
    #[error("a drag is already in progress for item {0}")]
    AlreadyActive(ItemId),
    /// The pressed item is not shown by any open view.
    #[error("item {0} is not shown in any open view")]
    NotInView(ItemId),
}
