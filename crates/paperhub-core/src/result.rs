//! Convenience result type alias for PaperHub.

use crate::error::AppError;

/// A specialized `Result` type for PaperHub operations.
pub type AppResult<T> = Result<T, AppError>;
