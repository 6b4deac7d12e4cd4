//! Exchange errors

use thiserror::Error;

/// Spreadsheet export/import errors
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Spreadsheet write failed: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("Spreadsheet read failed: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("Invalid number in sheet {sheet}, row {row}, column {column}: {value:?}")]
    InvalidNumber {
        sheet: &'static str,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Invalid value in sheet {sheet}, row {row}, column {column}: {value:?}")]
    InvalidValue {
        sheet: &'static str,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for exchange operations
pub type ExchangeResult<T> = Result<T, ExchangeError>;
