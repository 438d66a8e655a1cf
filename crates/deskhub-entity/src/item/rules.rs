//! Input limits for item mutations.

use deskhub_core::error::AppError;
use deskhub_core::result::AppResult;

use super::spatial::{Dimensions, Position};

/// Longest accepted item name, in characters.
pub const MAX_NAME_LEN: usize = 255;
/// Largest accepted width or height.
pub const MAX_DIMENSION: i32 = 10_000;
/// Largest accepted absolute coordinate.
pub const MAX_COORDINATE: i32 = 1_000_000;

/// Trim and check a display name.
pub fn normalize_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(AppError::validation("Name must not contain control characters"));
    }
    Ok(trimmed.to_string())
}

/// Check that a position lies on the canvas.
pub fn check_position(position: Position) -> AppResult<()> {
    let limit = MAX_COORDINATE.unsigned_abs();
    if position.x.unsigned_abs() > limit || position.y.unsigned_abs() > limit {
        return Err(AppError::validation(format!(
            "Position ({}, {}) is outside the canvas",
            position.x, position.y
        )));
    }
    Ok(())
}

/// Check that both dimensions are positive and bounded.
pub fn check_dimensions(dimensions: Dimensions) -> AppResult<()> {
    let valid = |v: i32| v > 0 && v <= MAX_DIMENSION;
    if !valid(dimensions.width) || !valid(dimensions.height) {
        return Err(AppError::validation(format!(
            "Dimensions must be between 1 and {MAX_DIMENSION}, got {}x{}",
            dimensions.width, dimensions.height
        )));
    }
    Ok(())
}
