//! Error types for Chronicle.

use thiserror::Error;

/// Result type alias for Chronicle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while recording audits.
#[derive(Error, Debug)]
pub enum Error {
    // Driver resolution errors
    #[error("audit driver not found: {0}")]
    DriverNotFound(String),

    #[error("construction of audit driver '{name}' failed: {reason}")]
    DriverConstructionFailed { name: String, reason: String },

    #[error("driver '{0}' does not satisfy the audit driver contract")]
    InvalidDriverContract(String),

    // Driver-internal persistence errors
    #[error("storage failure: {0}")]
    Storage(String),

    // Serialization errors
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
