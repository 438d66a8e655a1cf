//! Positions and sizes on the desktop canvas.

use serde::{Deserialize, Serialize};

/// A point on the desktop canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset from the canvas origin.
    pub x: i32,
    /// Vertical offset from the canvas origin.
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    pub fn offset_from(self, other: Position) -> Position {
        Position::new(self.x - other.x, self.y - other.y)
    }

    /// Translate by `delta`.
    pub fn translate(self, delta: Position) -> Position {
        Position::new(self.x + delta.x, self.y + delta.y)
    }

    /// Largest absolute component (Chebyshev distance from the origin).
    pub fn max_abs(self) -> i32 {
        self.x.abs().max(self.y.abs())
    }
}

/// Width and height of a resizable presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Dimensions {
    /// Create dimensions.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}
