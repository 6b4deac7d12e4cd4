//! Assistant errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Missing API key")]
    MissingApiKey,
}

pub type AssistantResult<T> = Result<T, AssistantError>;
