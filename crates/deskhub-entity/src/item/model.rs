//! Item entity model.

use deskhub_core::types::ItemId;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::kind::ItemKind;
use super::spatial::{Dimensions, Position};

/// A file or folder placeable on the desktop or inside a folder.
///
/// `position` is the single canonical desktop position. It is kept while
/// the item sits in a folder but only meaningful when `parent_id` is
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Identifier assigned by the repository.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// File or folder.
    pub kind: ItemKind,
    /// Size in bytes (opaque to the desktop).
    #[serde(default)]
    pub size: i64,
    /// MIME type, if known.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Reference into the binary store.
    #[serde(default)]
    pub content_ref: Option<String>,
    /// Desktop position.
    pub position: Position,
    /// Optional presentation size.
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    /// Containing folder.
    #[serde(default)]
    pub parent_id: Option<ItemId>,
}

/// Where an item currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// On the desktop canvas at a position.
    Desktop(Position),
    /// Inside a folder.
    InFolder(ItemId),
}

impl Item {
    /// Check if the item is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    /// Where the item lives.
    pub fn placement(&self) -> Placement {
        match self.parent_id {
            Some(folder_id) => Placement::InFolder(folder_id),
            None => Placement::Desktop(self.position),
        }
    }

    /// Check if the item sits directly on the desktop.
    pub fn is_on_desktop(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl<'r> FromRow<'r, PgRow> for Item {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let width: Option<i32> = row.try_get("width")?;
        let height: Option<i32> = row.try_get("height")?;
        let dimensions = match (width, height) {
            (Some(width), Some(height)) => Some(Dimensions { width, height }),
            _ => None,
        };

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            size: row.try_get("size_bytes")?,
            mime_type: row.try_get("mime_type")?,
            content_ref: row.try_get("content_ref")?,
            position: Position {
                x: row.try_get("pos_x")?,
                y: row.try_get("pos_y")?,
            },
            dimensions,
            parent_id: row.try_get("parent_id")?,
        })
    }
}

/// Data required to create a new item. It has no id until persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    /// Display name.
    pub name: String,
    /// File or folder.
    pub kind: ItemKind,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Binary store reference.
    pub content_ref: Option<String>,
    /// Desktop position.
    pub position: Position,
    /// Optional presentation size.
    pub dimensions: Option<Dimensions>,
    /// Containing folder.
    pub parent_id: Option<ItemId>,
}

impl NewItem {
    /// A new empty folder on the desktop.
    pub fn folder(name: impl Into<String>, position: Position) -> Self {
        Self::new(name, ItemKind::Folder, position)
    }

    /// A new file on the desktop.
    pub fn file(name: impl Into<String>, position: Position) -> Self {
        Self::new(name, ItemKind::File, position)
    }

    fn new(name: impl Into<String>, kind: ItemKind, position: Position) -> Self {
        Self {
            name: name.into(),
            kind,
            size: 0,
            mime_type: None,
            content_ref: None,
            position,
            dimensions: None,
            parent_id: None,
        }
    }

    /// Place the new item inside a folder.
    pub fn in_folder(mut self, folder_id: ItemId) -> Self {
        self.parent_id = Some(folder_id);
        self
    }

    /// Attach the id handed out by the repository.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            kind: self.kind,
            size: self.size,
            mime_type: self.mime_type,
            content_ref: self.content_ref,
            position: self.position,
            dimensions: self.dimensions,
            parent_id: self.parent_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_placement() {
        let item = NewItem::file("a.txt", Position::new(50, 50)).into_item(ItemId(1));
        assert_eq!(item.placement(), Placement::Desktop(Position::new(50, 50)));

        let inside = NewItem::file("b.txt", Position::new(0, 0))
            .in_folder(ItemId(2))
            .into_item(ItemId(3));
        assert_eq!(inside.placement(), Placement::InFolder(ItemId(2)));
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let mut item = NewItem::folder("Docs", Position::new(10, 20)).into_item(ItemId(2));
        item.mime_type = Some("inode/directory".into());
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["kind"], "folder");
        assert_eq!(json["parentId"], serde_json::Value::Null);
        assert_eq!(json["mimeType"], "inode/directory");
        assert_eq!(json["position"]["x"], 10);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let item: Item = serde_json::from_str(
            r#"{"id":1,"name":"a","kind":"file","position":{"x":1,"y":2}}"#,
        )
        .expect("deserialize");
        assert_eq!(item.parent_id, None);
        assert_eq!(item.dimensions, None);
        assert_eq!(item.size, 0);
    }
}
