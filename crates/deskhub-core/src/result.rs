//! Convenience result type alias for Deskhub.

use crate::error::AppError;

/// A specialized `Result` type for Deskhub operations.
pub type AppResult<T> = Result<T, AppError>;
