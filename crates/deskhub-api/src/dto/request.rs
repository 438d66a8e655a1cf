//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use deskhub_entity::{Dimensions, Position};

/// `{x, y}` body for position updates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct PositionRequest {
    /// Horizontal coordinate.
    #[validate(range(min = -1_000_000, max = 1_000_000, message = "x is outside the canvas"))]
    pub x: i32,
    /// Vertical coordinate.
    #[validate(range(min = -1_000_000, max = 1_000_000, message = "y is outside the canvas"))]
    pub y: i32,
}

impl From<PositionRequest> for Position {
    fn from(req: PositionRequest) -> Self {
        Position::new(req.x, req.y)
    }
}

/// `{width, height}` body for resizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct DimensionsRequest {
    /// Width in pixels.
    #[validate(range(min = 1, max = 10_000, message = "width must be between 1 and 10000"))]
    pub width: i32,
    /// Height in pixels.
    #[validate(range(min = 1, max = 10_000, message = "height must be between 1 and 10000"))]
    pub height: i32,
}

impl From<DimensionsRequest> for Dimensions {
    fn from(req: DimensionsRequest) -> Self {
        Dimensions::new(req.width, req.height)
    }
}

/// `{name}` body for renames.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameRequest {
    /// New display name.
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
}

/// Body of `POST /folders`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    /// Desktop position of the new folder.
    #[serde(default)]
    #[validate(nested)]
    pub position: Option<PositionRequest>,
}

/// Optional body of `DELETE /folders/items/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RemoveFromFolderRequest {
    /// Where to place the item on the desktop.
    #[serde(default)]
    #[validate(nested)]
    pub position: Option<PositionRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_range() {
        assert!(PositionRequest { x: 5, y: -5 }.validate().is_ok());
        assert!(PositionRequest { x: 1_000_001, y: 0 }.validate().is_err());
    }

    #[test]
    fn test_nested_position_is_validated() {
        let req = CreateFolderRequest {
            name: "Docs".into(),
            position: Some(PositionRequest { x: 0, y: -2_000_000 }),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_dimensions_must_be_positive() {
        assert!(DimensionsRequest { width: 0, height: 10 }.validate().is_err());
        assert!(DimensionsRequest { width: 320, height: 240 }.validate().is_ok());
    }
}
