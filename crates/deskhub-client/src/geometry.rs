//! Hit-testing geometry.

use deskhub_entity::item::rules::MAX_COORDINATE;
use deskhub_entity::{Dimensions, Position};

/// Size of a desktop icon when the item carries no dimensions.
pub const ICON_SIZE: Dimensions = Dimensions::new(72, 72);

/// Axis-aligned rectangle on the desktop canvas.
///
/// The origin is the top-left corner; the right and bottom edges are
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle anchored at `origin` with the given size.
    pub fn at(origin: Position, size: Dimensions) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// The whole canvas.
    pub const fn canvas() -> Self {
        Self::new(
            -MAX_COORDINATE,
            -MAX_COORDINATE,
            2 * MAX_COORDINATE + 1,
            2 * MAX_COORDINATE + 1,
        )
    }

    /// Whether `point` lies inside the rectangle.
    pub fn contains(&self, point: Position) -> bool {
        let (px, py) = (i64::from(point.x), i64::from(point.y));
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        px >= x
            && py >= y
            && px < x + i64::from(self.width.max(0))
            && py < y + i64::from(self.height.max(0))
    }

    /// The same rectangle moved by `(dx, dy)`.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..self
        }
    }

    pub fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(10, 10, 20, 20);
        assert!(rect.contains(Position::new(10, 10)));
        assert!(rect.contains(Position::new(29, 29)));
        assert!(!rect.contains(Position::new(30, 10)));
        assert!(!rect.contains(Position::new(9, 15)));
    }

    #[test]
    fn test_empty_rect_contains_nothing() {
        let rect = Rect::new(0, 0, 0, -5);
        assert!(!rect.contains(Position::new(0, 0)));
    }

    #[test]
    fn test_canvas_covers_coordinate_limits() {
        let canvas = Rect::canvas();
        assert!(canvas.contains(Position::new(-MAX_COORDINATE, -MAX_COORDINATE)));
        assert!(canvas.contains(Position::new(MAX_COORDINATE, MAX_COORDINATE)));
    }

    #[test]
    fn test_offset_moves_origin() {
        let rect = Rect::new(5, 5, 10, 10).offset(3, -2);
        assert_eq!(rect.origin(), Position::new(8, 3));
        assert_eq!(rect.width, 10);
    }
}
