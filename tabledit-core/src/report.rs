//! Per-row outcome of a commit.

use serde::Serialize;

use crate::row::RowIdentity;

/// Statement kind applied to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Delete,
    Update,
    Insert,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Update => "update",
            Self::Insert => "insert",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classification of a store error raised while applying a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Uniqueness, NOT NULL, CHECK or foreign-key failure.
    ConstraintViolation,
    /// Value could not be stored or read as the column's type.
    TypeMismatch,
    /// The targeted identity matched no row.
    RowNotFound,
    /// Any other statement-level error.
    Statement,
    /// The store went away mid-batch.
    ConnectionLost,
    /// The table or one of its columns no longer exists.
    TableVanished,
}

impl ErrorKind {
    /// Fatal kinds abort the batch and roll back the whole transaction.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionLost | Self::TableVanished)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ConstraintViolation => "constraint violation",
            Self::TypeMismatch => "type mismatch",
            Self::RowNotFound => "row not found",
            Self::Statement => "statement error",
            Self::ConnectionLost => "connection lost",
            Self::TableVanished => "table vanished",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowOutcome {
    pub target: RowIdentity,
    pub op: Operation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    pub target: RowIdentity,
    pub op: Operation,
    pub kind: ErrorKind,
    pub message: String,
}

impl std::fmt::Display for RowFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of row {} failed ({}): {}",
            self.op, self.target, self.kind, self.message
        )
    }
}

/// Result of one commit call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitReport {
    pub succeeded: Vec<RowOutcome>,
    pub failed: Vec<RowFailure>,
    /// Blank new rows that were not inserted.
    pub skipped: usize,
}

impl CommitReport {
    /// True when no row failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn record_success(&mut self, target: RowIdentity, op: Operation) {
        self.succeeded.push(RowOutcome { target, op });
    }

    pub fn record_failure(
        &mut self,
        target: RowIdentity,
        op: Operation,
        kind: ErrorKind,
        message: impl Into<String>,
    ) {
        self.failed.push(RowFailure {
            target,
            op,
            kind,
            message: message.into(),
        });
    }

    pub fn failure_for(&self, target: &RowIdentity) -> Option<&RowFailure> {
        self.failed.iter().find(|f| &f.target == target)
    }

    pub fn succeeded_count(&self, op: Operation) -> usize {
        self.succeeded.iter().filter(|o| o.op == op).count()
    }
}
