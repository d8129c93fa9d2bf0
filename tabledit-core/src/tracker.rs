//! In-memory edit tracking for one loaded table.
//!
//! The tracker owns the snapshot of the table as it was loaded and a ledger
//! of what the operator wants to change: sparse per-row column changes and a
//! set of rows to delete. Nothing here touches the store. [`EditTracker::build_plan`]
//! turns the ledger into a [`ReconciliationPlan`] for the commit step.

use std::collections::{HashMap, HashSet};

use crate::column::{ColumnDef, IdentityColumn, ResolvedIdentity};
use crate::error::TrackerError;
use crate::plan::{ColumnChanges, ReconciliationPlan, RowInsert, RowUpdate};
use crate::report::{CommitReport, Operation};
use crate::row::{NewRowId, RowIdentity, RowSnapshot};
use crate::value::CellValue;

/// Tracks buffered edits against a loaded table snapshot.
#[derive(Debug, Default)]
pub struct EditTracker {
    loaded: Option<LoadedTable>,
    next_new_id: u64,
}

#[derive(Debug)]
struct LoadedTable {
    table: String,
    columns: Vec<ColumnDef>,
    identity: ResolvedIdentity,
    rows: Vec<RowSnapshot>,
    changes: HashMap<RowIdentity, ColumnChanges>,
    deletions: HashSet<RowIdentity>,
    dirty: bool,
}

impl LoadedTable {
    fn column_index(&self, column: &str) -> Result<usize, TrackerError> {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| TrackerError::unknown_column(&self.table, column))
    }

    fn row_position(&self, identity: &RowIdentity) -> Option<usize> {
        self.rows.iter().position(|r| &r.identity == identity)
    }

    fn check_width(&self, actual: usize) -> Result<(), TrackerError> {
        if actual != self.columns.len() {
            return Err(TrackerError::RowWidth {
                expected: self.columns.len(),
                actual,
            });
        }
        Ok(())
    }

    fn stored_rows(&self, rows: Vec<Vec<CellValue>>) -> Result<Vec<RowSnapshot>, TrackerError> {
        rows.into_iter()
            .map(|values| {
                self.check_width(values.len())?;
                Ok(RowSnapshot {
                    identity: RowIdentity::Stored(values[self.identity.index].clone()),
                    values,
                })
            })
            .collect()
    }
}

impl EditTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot, columns and identity rule, clearing the ledger.
    ///
    /// `rows` are full rows in column order, as read from the store.
    pub fn load(
        &mut self,
        table: &str,
        columns: Vec<ColumnDef>,
        identity: &IdentityColumn,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<(), TrackerError> {
        let resolved = identity.resolve(&columns)?;
        let mut loaded = LoadedTable {
            table: table.to_string(),
            columns,
            identity: resolved,
            rows: Vec::new(),
            changes: HashMap::new(),
            deletions: HashSet::new(),
            dirty: false,
        };
        loaded.rows = loaded.stored_rows(rows)?;
        self.loaded = Some(loaded);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn loaded(&self) -> Result<&LoadedTable, TrackerError> {
        self.loaded.as_ref().ok_or(TrackerError::NotLoaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedTable, TrackerError> {
        self.loaded.as_mut().ok_or(TrackerError::NotLoaded)
    }

    /// Record a new value for one cell.
    ///
    /// New rows are edited in place; stored rows get a pending change that
    /// overwrites any earlier change to the same column.
    pub fn record_cell_edit(
        &mut self,
        identity: &RowIdentity,
        column: &str,
        value: CellValue,
    ) -> Result<(), TrackerError> {
        let loaded = self.loaded_mut()?;
        let col = loaded.column_index(column)?;
        let pos = loaded
            .row_position(identity)
            .ok_or_else(|| TrackerError::UnknownRow(identity.clone()))?;

        match identity {
            RowIdentity::New(_) => loaded.rows[pos].values[col] = value,
            RowIdentity::Stored(_) => {
                loaded
                    .changes
                    .entry(identity.clone())
                    .or_default()
                    .set(column, value);
            }
        }
        loaded.dirty = true;
        Ok(())
    }

    /// Append a row to the working view and return its sentinel identity.
    pub fn record_new_row(&mut self, values: Vec<CellValue>) -> Result<RowIdentity, TrackerError> {
        let id = NewRowId(self.next_new_id);
        let loaded = self.loaded.as_mut().ok_or(TrackerError::NotLoaded)?;
        loaded.check_width(values.len())?;

        let identity = RowIdentity::New(id);
        loaded.rows.push(RowSnapshot {
            identity: identity.clone(),
            values,
        });
        loaded.dirty = true;
        self.next_new_id += 1;
        Ok(identity)
    }

    /// Mark a row for deletion. Any pending change to it is dropped.
    pub fn record_deletion(&mut self, identity: &RowIdentity) -> Result<(), TrackerError> {
        let loaded = self.loaded_mut()?;
        if loaded.row_position(identity).is_none() {
            return Err(TrackerError::UnknownRow(identity.clone()));
        }
        loaded.changes.remove(identity);
        loaded.deletions.insert(identity.clone());
        loaded.dirty = true;
        Ok(())
    }

    /// Partition the ledger into deletes, updates and inserts.
    ///
    /// Deletion wins over any edit to the same row. New rows that are blank
    /// in every column are left out.
    pub fn build_plan(&self) -> Result<ReconciliationPlan, TrackerError> {
        let loaded = self.loaded()?;
        let mut plan = ReconciliationPlan::default();
        let mut seen: HashSet<&RowIdentity> = HashSet::new();

        for row in &loaded.rows {
            // identity values need not be unique under a non-key identity rule
            if !seen.insert(&row.identity) {
                continue;
            }
            let deleted = loaded.deletions.contains(&row.identity);

            match &row.identity {
                RowIdentity::Stored(value) if deleted => plan.to_delete.push(value.clone()),
                RowIdentity::Stored(value) => {
                    if let Some(changes) = loaded.changes.get(&row.identity)
                        && !changes.is_empty()
                    {
                        plan.to_update.push(RowUpdate {
                            identity: value.clone(),
                            changes: changes.clone(),
                        });
                    }
                }
                RowIdentity::New(_) if deleted => {}
                RowIdentity::New(id) => {
                    let insert = RowInsert {
                        id: *id,
                        values: row.values.clone(),
                    };
                    if !insert.is_blank() {
                        plan.to_insert.push(insert);
                    }
                }
            }
        }

        Ok(plan)
    }

    /// Drop pending changes and deletions.
    ///
    /// New rows, and edits already applied to them, stay in the snapshot.
    pub fn discard(&mut self) -> Result<(), TrackerError> {
        let loaded = self.loaded_mut()?;
        loaded.changes.clear();
        loaded.deletions.clear();
        loaded.dirty = loaded.rows.iter().any(|r| r.identity.is_new());
        Ok(())
    }

    /// Replace the snapshot with freshly loaded rows, keeping only the part of
    /// the ledger whose commit failed.
    ///
    /// Failed updates are kept if their row still exists, failed deletes are
    /// kept likewise, and failed inserts come back as new rows under their
    /// original sentinel.
    pub fn reload_retaining_failures(
        &mut self,
        rows: Vec<Vec<CellValue>>,
        report: &CommitReport,
    ) -> Result<(), TrackerError> {
        let loaded = self.loaded_mut()?;
        let fresh = loaded.stored_rows(rows)?;

        let mut changes = HashMap::new();
        let mut deletions = HashSet::new();
        let mut new_rows = Vec::new();

        for failure in &report.failed {
            let still_stored = fresh.iter().any(|r| r.identity == failure.target);
            match failure.op {
                Operation::Update if still_stored => {
                    if let Some(pending) = loaded.changes.get(&failure.target) {
                        changes.insert(failure.target.clone(), pending.clone());
                    }
                }
                Operation::Delete if still_stored => {
                    deletions.insert(failure.target.clone());
                }
                Operation::Insert => {
                    if let Some(pos) = loaded.row_position(&failure.target) {
                        new_rows.push(loaded.rows[pos].clone());
                    }
                }
                _ => {}
            }
        }

        loaded.rows = fresh;
        loaded.rows.extend(new_rows);
        loaded.dirty = !changes.is_empty()
            || !deletions.is_empty()
            || loaded.rows.iter().any(|r| r.identity.is_new());
        loaded.changes = changes;
        loaded.deletions = deletions;
        Ok(())
    }

    /// Snapshot rows not pending deletion, with pending changes applied.
    pub fn working_rows(&self) -> Vec<RowSnapshot> {
        let Some(loaded) = &self.loaded else {
            return Vec::new();
        };

        loaded
            .rows
            .iter()
            .filter(|row| !loaded.deletions.contains(&row.identity))
            .map(|row| {
                let mut row = row.clone();
                if let Some(changes) = loaded.changes.get(&row.identity) {
                    for (column, value) in changes.iter() {
                        if let Ok(col) = loaded.column_index(column) {
                            row.values[col] = value.clone();
                        }
                    }
                }
                row
            })
            .collect()
    }

    /// Rows as loaded, plus new rows. Pending changes are not applied.
    pub fn rows(&self) -> &[RowSnapshot] {
        self.loaded.as_ref().map_or(&[], |l| l.rows.as_slice())
    }

    pub fn row(&self, identity: &RowIdentity) -> Option<&RowSnapshot> {
        self.rows().iter().find(|r| &r.identity == identity)
    }

    pub fn table(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.table.as_str())
    }

    pub fn columns(&self) -> &[ColumnDef] {
        self.loaded.as_ref().map_or(&[], |l| l.columns.as_slice())
    }

    pub fn identity_column(&self) -> Option<&ResolvedIdentity> {
        self.loaded.as_ref().map(|l| &l.identity)
    }

    pub fn pending_changes(&self, identity: &RowIdentity) -> Option<&ColumnChanges> {
        self.loaded.as_ref()?.changes.get(identity)
    }

    pub fn is_pending_deletion(&self, identity: &RowIdentity) -> bool {
        self.loaded
            .as_ref()
            .is_some_and(|l| l.deletions.contains(identity))
    }

    /// True once anything has been recorded since the last load or discard.
    pub fn is_dirty(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.dirty)
    }
}

#[cfg(test)]
#[path = "tests/tracker_tests.rs"]
mod tests;
