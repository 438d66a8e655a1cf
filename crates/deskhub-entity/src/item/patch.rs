//! Single-field item changes shared by the server and the client.

use deskhub_core::types::ItemId;
use serde::{Deserialize, Serialize};

use super::model::Item;
use super::spatial::{Dimensions, Position};

/// One mutation of an item.
///
/// The server's repositories persist patches and the client applies the
/// same patches optimistically to its local snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ItemPatch {
    /// Move on the desktop.
    Position(Position),
    /// Resize.
    Dimensions(Dimensions),
    /// Rename.
    Name(String),
    /// Place the item in a folder.
    EnterFolder {
        /// The destination folder.
        folder_id: ItemId,
    },
    /// Take the item out of its folder, optionally placing it.
    LeaveFolder {
        /// New desktop position, if any.
        position: Option<Position>,
    },
}

impl ItemPatch {
    /// Apply the patch to an item in place.
    pub fn apply_to(&self, item: &mut Item) {
        match self {
            Self::Position(position) => item.position = *position,
            Self::Dimensions(dimensions) => item.dimensions = Some(*dimensions),
            Self::Name(name) => item.name = name.clone(),
            Self::EnterFolder { folder_id } => item.parent_id = Some(*folder_id),
            Self::LeaveFolder { position } => {
                item.parent_id = None;
                if let Some(position) = position {
                    item.position = *position;
                }
            }
        }
    }

    /// Return a patched copy of `item`.
    pub fn applied(&self, item: &Item) -> Item {
        let mut next = item.clone();
        self.apply_to(&mut next);
        next
    }

    /// Whether the patch can change which scope the item belongs to.
    pub fn changes_membership(&self) -> bool {
        matches!(self, Self::EnterFolder { .. } | Self::LeaveFolder { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::model::NewItem;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_leave_folder_keeps_dimensions() {
        let mut item = NewItem::file("notes.txt", Position::new(50, 50)).into_item(ItemId(3));
        item.dimensions = Some(Dimensions::new(300, 200));
        item.parent_id = Some(ItemId(2));

        let out = ItemPatch::LeaveFolder {
            position: Some(Position::new(120, 80)),
        }
        .applied(&item);

        assert_eq!(out.parent_id, None);
        assert_eq!(out.position, Position::new(120, 80));
        assert_eq!(out.dimensions, Some(Dimensions::new(300, 200)));
    }

    #[test]
    fn test_leave_folder_without_position_keeps_stored_one() {
        let mut item = NewItem::file("a", Position::new(5, 6)).into_item(ItemId(1));
        item.parent_id = Some(ItemId(2));
        ItemPatch::LeaveFolder { position: None }.apply_to(&mut item);
        assert_eq!(item.position, Position::new(5, 6));
        assert!(item.parent_id.is_none());
    }
}
