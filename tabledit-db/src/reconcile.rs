//! Apply a reconciliation plan to the store in one transaction.
//!
//! Statements run in three phases (deletes, updates, inserts). A row whose
//! statement fails with a data error is recorded in the report and the batch
//! moves on; the surviving statements are committed together. An error that
//! means the connection or the table itself is gone stops the batch and rolls
//! everything back, as does any error after which SQLite has already ended
//! the transaction on its own.

use rusqlite::{Connection, ErrorCode};
use tabledit_core::{
    CellValue, ColumnDef, CommitReport, ErrorKind, Operation, ReconciliationPlan,
    ResolvedIdentity, RowIdentity,
};
use thiserror::Error;

use crate::schema::{describe, SchemaError};
use crate::statements::{
    delete_statement, insert_statement, update_statement, InvalidIdentifier, Statement,
    ValidatedTable,
};

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),
    /// A fatal store error rolled back the whole batch.
    #[error("Commit rolled back ({kind}): {message}")]
    Aborted {
        kind: ErrorKind,
        message: String,
        report: CommitReport,
    },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// The table a plan is applied to.
#[derive(Debug, Clone)]
pub struct CommitTarget {
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub identity: ResolvedIdentity,
}

/// A statement ready to run, with the row it belongs to.
struct PlannedStatement {
    target: RowIdentity,
    op: Operation,
    statement: Statement,
}

/// Apply `plan` to `target` inside one transaction.
///
/// Every table and column name is checked against a fresh `describe` of the
/// table before the transaction opens. The caller's edit ledger is not
/// touched; inspect the report and decide what to keep.
pub fn commit(
    conn: &Connection,
    target: &CommitTarget,
    plan: &ReconciliationPlan,
) -> Result<CommitReport, CommitError> {
    let described = describe(conn, &target.table)?;
    let table = ValidatedTable::new(&target.table, &described);
    let (statements, skipped) = build_statements(&table, target, plan)?;

    let mut report = CommitReport {
        skipped,
        ..Default::default()
    };

    log::debug!(
        "Committing {} statements to {} ({} blank rows skipped)",
        statements.len(),
        target.table,
        skipped
    );

    let tx = conn.unchecked_transaction()?;

    for planned in &statements {
        log::debug!("{} {:?}", planned.statement.sql, planned.statement.params);
        let result = tx.execute(&planned.statement.sql, planned.statement.bind());

        match result {
            Ok(0) if planned.op != Operation::Insert => {
                log::warn!("{} of row {} matched no row", planned.op, planned.target);
                report.record_failure(
                    planned.target.clone(),
                    planned.op,
                    ErrorKind::RowNotFound,
                    format!("no row with {} = {}", target.identity.name, planned.target),
                );
            }
            Ok(_) => report.record_success(planned.target.clone(), planned.op),
            Err(e) => {
                let kind = classify_error(&e);
                let message = e.to_string();
                // ON CONFLICT ROLLBACK and RAISE(ROLLBACK) end the transaction
                // from inside SQLite; nothing after this point would be atomic.
                let ended_by_store = tx.is_autocommit();
                if kind.is_fatal() || ended_by_store {
                    log::warn!("Fatal {} on row {}: {}", kind, planned.target, message);
                    if ended_by_store {
                        log::warn!("Transaction was rolled back by the store");
                    } else if let Err(rollback_err) = tx.rollback() {
                        log::warn!("Rollback failed: {}", rollback_err);
                    }
                    return Err(CommitError::Aborted {
                        kind,
                        report: aborted_report(&statements, planned, kind, &message, skipped),
                        message,
                    });
                }
                log::warn!("{} of row {} failed: {}", planned.op, planned.target, message);
                report.record_failure(planned.target.clone(), planned.op, kind, message);
            }
        }
    }

    tx.commit()?;

    log::info!(
        "Committed {}: {} deleted, {} updated, {} inserted, {} failed",
        target.table,
        report.succeeded_count(Operation::Delete),
        report.succeeded_count(Operation::Update),
        report.succeeded_count(Operation::Insert),
        report.failed.len()
    );
    Ok(report)
}

/// Build every statement up front so invalid identifiers fail before any
/// SQL runs. Returns the statements in execution order and the number of
/// blank inserts skipped.
fn build_statements(
    table: &ValidatedTable,
    target: &CommitTarget,
    plan: &ReconciliationPlan,
) -> Result<(Vec<PlannedStatement>, usize), CommitError> {
    let key = &target.identity.name;
    let mut statements = Vec::with_capacity(plan.len());
    let mut skipped = 0;

    for identity in &plan.to_delete {
        statements.push(PlannedStatement {
            target: stored(identity),
            op: Operation::Delete,
            statement: delete_statement(table, key, identity)?,
        });
    }

    for update in &plan.to_update {
        // empty change sets are a no-op success
        match update_statement(table, key, update)? {
            Some(statement) => statements.push(PlannedStatement {
                target: stored(&update.identity),
                op: Operation::Update,
                statement,
            }),
            None => log::debug!("Nothing to update for row {}", update.identity),
        }
    }

    for insert in &plan.to_insert {
        match insert_statement(table, &target.columns, insert)? {
            Some(statement) => statements.push(PlannedStatement {
                target: RowIdentity::New(insert.id),
                op: Operation::Insert,
                statement,
            }),
            None => skipped += 1,
        }
    }

    Ok((statements, skipped))
}

fn stored(value: &CellValue) -> RowIdentity {
    RowIdentity::Stored(value.clone())
}

/// Report for a rolled-back batch: every statement is marked failed.
fn aborted_report(
    statements: &[PlannedStatement],
    culprit: &PlannedStatement,
    kind: ErrorKind,
    message: &str,
    skipped: usize,
) -> CommitReport {
    let mut report = CommitReport {
        skipped,
        ..Default::default()
    };
    for planned in statements {
        let text = if std::ptr::eq(planned, culprit) {
            message.to_string()
        } else {
            format!("rolled back: {}", message)
        };
        report.record_failure(planned.target.clone(), planned.op, kind, text);
    }
    report
}

/// Map a rusqlite error onto the row-level error taxonomy.
pub fn classify_error(err: &rusqlite::Error) -> ErrorKind {
    match err {
        rusqlite::Error::SqliteFailure(e, message) => {
            let message = message.as_deref().unwrap_or_default();
            if message.starts_with("no such table") || message.starts_with("no such column") {
                return ErrorKind::TableVanished;
            }
            match e.code {
                ErrorCode::ConstraintViolation => ErrorKind::ConstraintViolation,
                ErrorCode::TypeMismatch => ErrorKind::TypeMismatch,
                ErrorCode::SchemaChanged => ErrorKind::TableVanished,
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied
                | ErrorCode::OperationAborted
                | ErrorCode::OperationInterrupted => ErrorKind::ConnectionLost,
                _ => ErrorKind::Statement,
            }
        }
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::ToSqlConversionFailure(..) => ErrorKind::TypeMismatch,
        _ => ErrorKind::Statement,
    }
}
