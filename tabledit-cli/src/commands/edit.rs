use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabledit_core::{ColumnDef, CommitReport, Operation, ReconciliationPlan};
use tabledit_db::CommitError;
use tabledit_lib::{Session, SessionError};

use crate::commands::{Globals, Target};
use crate::error::CliError;

pub(crate) struct EditArgs {
    pub sets: Vec<String>,
    pub inserts: Vec<String>,
    pub deletes: Vec<String>,
    pub dry_run: bool,
    pub json: bool,
}

/// One `--set ROW:COLUMN=VALUE` argument.
#[derive(Debug, PartialEq)]
struct CellAssignment<'a> {
    row: &'a str,
    column: &'a str,
    value: &'a str,
}

fn parse_set(arg: &str) -> Result<CellAssignment<'_>, CliError> {
    let malformed = || CliError::usage(format!("'{}': expected ROW:COLUMN=VALUE", arg));
    let (row, rest) = arg.split_once(':').ok_or_else(malformed)?;
    let (column, value) = rest.split_once('=').ok_or_else(malformed)?;
    if row.is_empty() || column.is_empty() {
        return Err(malformed());
    }
    Ok(CellAssignment { row, column, value })
}

/// Resolve a column given by name or zero-based index.
fn column_index(columns: &[ColumnDef], column: &str) -> Result<usize, CliError> {
    if let Some(i) = columns.iter().position(|c| c.name == column) {
        return Ok(i);
    }
    column
        .parse::<usize>()
        .map_err(|_| CliError::usage(format!("unknown column '{}'", column)))
}

fn find_row(session: &Session, text: &str) -> Result<tabledit_core::RowIdentity, CliError> {
    session
        .find_row(text)
        .ok_or_else(|| CliError::usage(format!("no row with identity '{}'", text)))
}

/// Record the requested edits, then print the plan or commit it.
pub(crate) fn run_edit(globals: &Globals, target: Target, args: EditArgs) -> Result<(), CliError> {
    let mut session = globals.open_session(target.db)?;
    session.load_table(&target.table)?;

    for insert in &args.inserts {
        let values: Vec<String> = insert.split(',').map(str::to_string).collect();
        let id = session.on_request_new_row(&values)?;
        log::debug!("Recorded new row {}", id);
    }

    for set in &args.sets {
        let assignment = parse_set(set)?;
        let identity = find_row(&session, assignment.row)?;
        let columns = session.tracker().map(|t| t.columns()).unwrap_or_default();
        let index = column_index(columns, assignment.column)?;
        session.on_cell_edit(&identity, index, assignment.value)?;
    }

    let deletions = args
        .deletes
        .iter()
        .map(|row| find_row(&session, row))
        .collect::<Result<Vec<_>, _>>()?;
    session.on_request_delete(&deletions)?;

    if args.dry_run {
        let plan = session.plan()?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    let result = session.on_request_commit();
    if let Err(SessionError::Commit(CommitError::Aborted { report, .. })) = &result {
        print_report(report, args.json)?;
    }
    let report = result?;
    print_report(&report, args.json)?;

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::RowsFailed(report.failed.len()))
    }
}

fn print_plan(plan: &ReconciliationPlan) {
    if plan.is_empty() {
        log::info!("Nothing to commit");
        return;
    }

    for identity in &plan.to_delete {
        log::info!("{} {}", "DELETE".if_supports_color(Stdout, |t| t.red()), identity);
    }
    for update in &plan.to_update {
        let changes: Vec<String> = update
            .changes
            .iter()
            .map(|(column, value)| format!("{} = {}", column, value))
            .collect();
        log::info!(
            "{} {}: {}",
            "UPDATE".if_supports_color(Stdout, |t| t.yellow()),
            update.identity,
            changes.join(", "),
        );
    }
    for insert in &plan.to_insert {
        let values: Vec<String> = insert.values.iter().map(|v| v.to_string()).collect();
        log::info!(
            "{} {}: ({})",
            "INSERT".if_supports_color(Stdout, |t| t.green()),
            insert.id,
            values.join(", "),
        );
    }
}

fn print_report(report: &CommitReport, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for op in [Operation::Delete, Operation::Update, Operation::Insert] {
        let count = report.succeeded_count(op);
        if count > 0 {
            log::info!(
                "{} {} {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                count,
                op,
            );
        }
    }
    if report.skipped > 0 {
        log::info!(
            "{}",
            format!("{} blank new row(s) skipped", report.skipped)
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    for failure in &report.failed {
        log::warn!("{} {}", "\u{2718}".if_supports_color(Stdout, |t| t.red()), failure);
    }
    if report.succeeded.is_empty() && report.failed.is_empty() {
        log::info!("Nothing committed");
    }
    Ok(())
}
