//! Common error types for docuvault.

use thiserror::Error;

/// Top-level error type for docuvault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Resource (member, document, or file) absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected (disallowed file type, oversized upload, bad path).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// File vault operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record store operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Report rendering failed.
    #[error("Render error: {0}")]
    Render(String),

    /// Anything that should never surface to a caller verbatim.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the error maps to a client-visible "not found" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True when the error maps to a client-visible "bad input" outcome.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
