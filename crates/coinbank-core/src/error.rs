//! Error types for Coinbank core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages.

use thiserror::Error;

/// Result type alias for Coinbank operations.
pub type Result<T> = std::result::Result<T, CoinbankError>;

/// Core error type for Coinbank operations.
#[derive(Debug, Error)]
pub enum CoinbankError {
    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed filter, update, or document supplied by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Data does not have the shape an operation needs
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for CoinbankError {
    fn from(err: serde_json::Error) -> Self {
        CoinbankError::Validation(err.to_string())
    }
}

impl From<rusqlite::Error> for CoinbankError {
    fn from(err: rusqlite::Error) -> Self {
        CoinbankError::Storage(format!("SQLite error: {}", err))
    }
}
