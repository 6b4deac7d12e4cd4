//! CLI error types and exit codes

use thiserror::Error;

use obra_exchange::ExchangeError;
use obra_runtime::RuntimeError;

/// Exit codes
/// - 1: General error
/// - 3: Remote store or assistant unreachable
/// - 4: Invalid input or workbook
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<ExchangeError> for CliError {
    fn from(e: ExchangeError) -> Self {
        CliError::Runtime(RuntimeError::Exchange(e))
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Runtime(RuntimeError::Sync(_) | RuntimeError::Assistant(_)) => 3,
            CliError::Runtime(RuntimeError::Exchange(_)) => 4,
            CliError::Runtime(_) => 1,
            CliError::Validation(_) | CliError::NotFound(_) => 4,
            CliError::Io(_) => 1,
        }
    }

    pub fn print(&self) {
        eprintln!("Error: {self}");
    }
}
