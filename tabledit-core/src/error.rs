use thiserror::Error;

use crate::row::RowIdentity;

/// Errors raised by the edit tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A mutation was attempted before any table was loaded
    #[error("No table loaded")]
    NotLoaded,

    /// Column name is not part of the loaded table
    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Row identity does not match any row in the working view
    #[error("Unknown row {0}")]
    UnknownRow(RowIdentity),

    /// Row does not have one value per column
    #[error("Row has {actual} values, table has {expected} columns")]
    RowWidth { expected: usize, actual: usize },

    /// Configured identity column is not part of the table
    #[error("Identity column '{0}' not found")]
    UnknownIdentityColumn(String),

    /// Table has no columns to address rows by
    #[error("Table has no columns")]
    NoColumns,
}

impl TrackerError {
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}
