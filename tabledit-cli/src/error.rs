use tabledit_lib::SessionError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Session operation failed
    #[error("{0}")]
    Session(#[from] SessionError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Malformed command-line value
    #[error("Invalid argument: {0}")]
    Usage(String),

    /// The commit ran but some rows were rejected
    #[error("{0} row(s) failed to commit")]
    RowsFailed(usize),

    /// Output serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
