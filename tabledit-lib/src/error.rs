use tabledit_core::TrackerError;
use tabledit_db::{CommitError, SchemaError};
use thiserror::Error;

/// Errors surfaced by [`crate::Session`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No database is open
    #[error("No database open")]
    NotOpen,

    /// A database is open but no table has been loaded
    #[error("No table loaded")]
    NotLoaded,

    /// Grid column index outside the loaded table
    #[error("Column index {index} out of range (table has {count} columns)")]
    ColumnIndex { index: usize, count: usize },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
