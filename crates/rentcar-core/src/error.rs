use thiserror::Error;

use crate::validation::FieldErrors;

/// Application-wide error types for rentcar.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request input failed field-level validation.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write rejected by a uniqueness constraint.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A store call exceeded its time budget.
    #[error("Store call timed out after {0} seconds")]
    Timeout(u64),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Password hashing or hash parsing failed.
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}
