//! Sync errors

use thiserror::Error;

/// Remote synchronization errors
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote rejected {table}: status {status}: {body}")]
    Remote {
        table: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed {table} row: {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Remote unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid remote configuration: {0}")]
    Config(String),
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
