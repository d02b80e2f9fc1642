//! Error types for cubby.

use thiserror::Error;

/// Common error type for cubby.
#[derive(Error, Debug)]
pub enum CubbyError {
    /// Database error.
    ///
    /// Generic store-level error wrapping failures from the sqlx backend.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A metadata record exists but its blob is missing from disk.
    ///
    /// This is a corruption signal, not a legitimate absence; it must never
    /// be reported to callers as NotFound.
    #[error("blob missing from storage: {0}")]
    BlobMissing(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for CubbyError {
    fn from(e: sqlx::Error) -> Self {
        CubbyError::Database(e.to_string())
    }
}

/// Result type alias for cubby operations.
pub type Result<T> = std::result::Result<T, CubbyError>;
