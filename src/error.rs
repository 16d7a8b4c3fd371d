use thiserror::Error;

/// Errors that can leave the scanner's parsing and reporting glue.
///
/// Dial and banner failures never appear here: they are absorbed by the
/// attempter and turned into a closed port or a missing banner.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid port value: {0}")]
    InvalidPort(String),

    #[error("invalid port range {start}-{end}")]
    InvalidRange { start: String, end: String },

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
