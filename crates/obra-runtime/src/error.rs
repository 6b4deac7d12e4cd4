//! Runtime errors

use thiserror::Error;

use obra_assistant::AssistantError;
use obra_core::ObraError;
use obra_exchange::ExchangeError;
use obra_sync::SyncError;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    State(#[from] ObraError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
