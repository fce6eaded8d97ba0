// src/domain/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Implement From for common error types
impl From<String> for JournalError {
    fn from(s: String) -> Self {
        JournalError::Storage(s)
    }
}

// Result type alias for convenience
pub type JournalResult<T> = Result<T, JournalError>;
