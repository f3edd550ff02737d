//! Directory errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("{0}")]
    Validation(String),

    #[error("User with this phone number already exists: {0}")]
    DuplicatePhoneNumber(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("No user or contact found for phone number {0}")]
    NotFound(String),

    #[error("Conflicting directory write: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl DirectoryError {
    /// Shorthand for a missing or malformed request field.
    pub fn validation(message: impl Into<String>) -> Self {
        DirectoryError::Validation(message.into())
    }
}

impl From<std::io::Error> for DirectoryError {
    fn from(e: std::io::Error) -> Self {
        DirectoryError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        DirectoryError::Storage(format!("JSON serialization error: {}", e))
    }
}

impl From<argon2::password_hash::Error> for DirectoryError {
    fn from(e: argon2::password_hash::Error) -> Self {
        DirectoryError::PasswordHash(e.to_string())
    }
}
