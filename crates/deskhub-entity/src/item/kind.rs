//! Item kind.

use serde::{Deserialize, Serialize};

/// Whether an item is a regular file or a folder.
///
/// This is the only place folder-ness is decided; everything else matches
/// on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A regular file.
    #[serde(alias = "regularFile")]
    File,
    /// A folder. Folders hold files only.
    Folder,
}

impl ItemKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemKind {
    type Err = deskhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "regularfile" => Ok(Self::File),
            "folder" => Ok(Self::Folder),
            _ => Err(deskhub_core::AppError::validation(format!(
                "Invalid item kind: '{s}'"
            ))),
        }
    }
}
