// Error handling for the log parser and report pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LabnoteError>;

#[derive(Error, Debug)]
pub enum LabnoteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported log format: {0} (expected one of lvm, lvmspl, putty, nivb)")]
    UnsupportedFormat(String),

    #[error("Unsupported encoding label: {0}")]
    UnsupportedEncoding(String),

    #[error("Run index {index} out of range ({count} runs)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Invalid range start {start} for text of {len} bytes")]
    InvalidRange { start: usize, len: usize },

    #[error("Invalid plot directive: {0}")]
    InvalidDirective(String),

    #[error("Column {column:?} not found in run {run}")]
    ColumnNotFound { run: usize, column: String },

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
