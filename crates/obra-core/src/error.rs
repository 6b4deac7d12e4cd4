//! Error types for ObraApp

use thiserror::Error;

/// Core ObraApp errors
#[derive(Error, Debug)]
pub enum ObraError {
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    // Persistence errors
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for ObraApp operations
pub type ObraResult<T> = Result<T, ObraError>;
