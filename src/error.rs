//! Error types for usermail.

use thiserror::Error;

/// Common error type for usermail.
#[derive(Error, Debug)]
pub enum UsermailError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A unique field is already taken.
    #[error("{0} already exists")]
    Conflict(String),

    /// Mail template error.
    #[error("template error: {0}")]
    Template(#[from] crate::mail::TemplateError),

    /// Password hashing error.
    #[error("password error: {0}")]
    Password(#[from] crate::user::PasswordError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for UsermailError {
    fn from(e: sqlx::Error) -> Self {
        UsermailError::Database(e.to_string())
    }
}

impl From<crate::user::ValidationError> for UsermailError {
    fn from(e: crate::user::ValidationError) -> Self {
        UsermailError::Validation(e.to_string())
    }
}

/// Result type alias for usermail operations.
pub type Result<T> = std::result::Result<T, UsermailError>;
