//! Convenience result type alias for LostFound.

use crate::error::AppError;

/// A specialized `Result` type for LostFound operations.
pub type AppResult<T> = Result<T, AppError>;
