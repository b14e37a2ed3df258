//! Convenience result type alias for the admin dashboard.

use crate::error::AppError;

/// A specialized `Result` type for dashboard operations.
pub type AppResult<T> = Result<T, AppError>;
