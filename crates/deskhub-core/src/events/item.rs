//! Item-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::ItemId;

/// A set of items that is displayed together: the desktop canvas or the
/// contents of one folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "camelCase")]
pub enum MembershipScope {
    /// Unparented items.
    Desktop,
    /// Children of a folder.
    Folder {
        /// The folder ID.
        folder_id: ItemId,
    },
}

impl MembershipScope {
    /// Scope of an item with the given parent.
    pub fn of_parent(parent_id: Option<ItemId>) -> Self {
        match parent_id {
            Some(folder_id) => Self::Folder { folder_id },
            None => Self::Desktop,
        }
    }
}

/// Size of a membership scope right after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipCount {
    /// The scope that changed.
    pub scope: MembershipScope,
    /// Number of items in the scope after the change.
    pub item_count: u64,
}

/// Events related to item operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemEvent {
    /// An item (usually a folder) was created.
    Created {
        /// The item ID.
        item_id: ItemId,
        /// The item name.
        name: String,
        /// Scopes whose contents changed.
        affected: Vec<MembershipCount>,
    },
    /// An item changed membership.
    Moved {
        /// The item ID.
        item_id: ItemId,
        /// Folder the item left (`None` for the desktop).
        from_folder_id: Option<ItemId>,
        /// Folder the item entered (`None` for the desktop).
        to_folder_id: Option<ItemId>,
        /// Scopes whose contents changed.
        affected: Vec<MembershipCount>,
    },
    /// An item was renamed.
    Renamed {
        /// The item ID.
        item_id: ItemId,
        /// The new name.
        name: String,
        /// Scopes whose contents changed.
        affected: Vec<MembershipCount>,
    },
    /// An item's dimensions changed.
    Resized {
        /// The item ID.
        item_id: ItemId,
        /// Scopes whose contents changed.
        affected: Vec<MembershipCount>,
    },
    /// An item's desktop position changed.
    Repositioned {
        /// The item ID.
        item_id: ItemId,
        /// Scopes whose contents changed.
        affected: Vec<MembershipCount>,
    },
    /// An item was deleted.
    Deleted {
        /// The item ID.
        item_id: ItemId,
        /// Scopes whose contents changed.
        affected: Vec<MembershipCount>,
    },
}

impl ItemEvent {
    /// The item the event is about.
    pub fn item_id(&self) -> ItemId {
        match self {
            Self::Created { item_id, .. }
            | Self::Moved { item_id, .. }
            | Self::Renamed { item_id, .. }
            | Self::Resized { item_id, .. }
            | Self::Repositioned { item_id, .. }
            | Self::Deleted { item_id, .. } => *item_id,
        }
    }

    /// Scopes whose contents changed.
    pub fn affected(&self) -> &[MembershipCount] {
        match self {
            Self::Created { affected, .. }
            | Self::Moved { affected, .. }
            | Self::Renamed { affected, .. }
            | Self::Resized { affected, .. }
            | Self::Repositioned { affected, .. }
            | Self::Deleted { affected, .. } => affected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_of_parent() {
        assert_eq!(MembershipScope::of_parent(None), MembershipScope::Desktop);
        assert_eq!(
            MembershipScope::of_parent(Some(ItemId(2))),
            MembershipScope::Folder {
                folder_id: ItemId(2)
            }
        );
    }

    #[test]
    fn test_affected_is_exposed_for_every_variant() {
        let event = ItemEvent::Moved {
            item_id: ItemId(1),
            from_folder_id: None,
            to_folder_id: Some(ItemId(2)),
            affected: vec![
                MembershipCount {
                    scope: MembershipScope::Desktop,
                    item_count: 4,
                },
                MembershipCount {
                    scope: MembershipScope::Folder {
                        folder_id: ItemId(2),
                    },
                    item_count: 1,
                },
            ],
        };
        assert_eq!(event.item_id(), ItemId(1));
        assert_eq!(event.affected().len(), 2);
    }
}
