//! Editing session: one connection, at most one loaded table.
//!
//! ```text
//! Closed --open--> Opened --load_table--> Loaded
//! Loaded --load_table(other)--> Loaded
//! Opened | Loaded --close--> Closed
//! ```
//!
//! The `on_*` methods are what a presentation layer calls in response to
//! operator actions. Grid text is converted to typed values here, using the
//! affinity of the target column, before it reaches the tracker.

use std::path::Path;

use rusqlite::Connection;
use tabledit_core::{
    CellValue, ColumnDef, CommitReport, EditTracker, ReconciliationPlan, RowIdentity,
    TrackerError,
};
use tabledit_db::{
    describe, list_tables, load_rows, open_database, open_memory, table_name, CommitTarget,
};

use crate::error::SessionError;
use crate::settings::Settings;

/// Observable state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opened,
    Loaded,
}

enum State {
    Closed,
    Opened(Connection),
    Loaded(Connection, Box<LoadedTable>),
}

struct LoadedTable {
    tracker: EditTracker,
    target: CommitTarget,
}

pub struct Session {
    settings: Settings,
    state: State,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            state: State::Closed,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        match self.state {
            State::Closed => SessionState::Closed,
            State::Opened(_) => SessionState::Opened,
            State::Loaded(..) => SessionState::Loaded,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, State::Closed)
    }

    /// Open a database file, replacing any open connection.
    pub fn open(&mut self, path: &Path) -> Result<(), SessionError> {
        let conn = open_database(path, &self.settings.store_options())?;
        log::info!("Opened {}", path.display());
        self.state = State::Opened(conn);
        Ok(())
    }

    /// Open an empty in-memory database, replacing any open connection.
    pub fn open_in_memory(&mut self) -> Result<(), SessionError> {
        self.state = State::Opened(open_memory()?);
        Ok(())
    }

    /// Close the connection, dropping any loaded table and its ledger.
    pub fn close(&mut self) -> Result<(), SessionError> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Closed => Ok(()),
            State::Opened(conn) | State::Loaded(conn, _) => {
                conn.close().map_err(|(_, e)| SessionError::Sqlite(e))
            }
        }
    }

    /// The open connection, for read-only queries a front end needs.
    pub fn connection(&self) -> Result<&Connection, SessionError> {
        match &self.state {
            State::Closed => Err(SessionError::NotOpen),
            State::Opened(conn) | State::Loaded(conn, _) => Ok(conn),
        }
    }

    fn loaded(&self) -> Result<(&Connection, &LoadedTable), SessionError> {
        match &self.state {
            State::Closed => Err(SessionError::NotOpen),
            State::Opened(_) => Err(SessionError::NotLoaded),
            State::Loaded(conn, table) => Ok((conn, &**table)),
        }
    }

    fn loaded_mut(&mut self) -> Result<(&Connection, &mut LoadedTable), SessionError> {
        match &mut self.state {
            State::Closed => Err(SessionError::NotOpen),
            State::Opened(_) => Err(SessionError::NotLoaded),
            State::Loaded(conn, table) => Ok((&*conn, &mut **table)),
        }
    }

    pub fn tables(&self) -> Result<Vec<String>, SessionError> {
        Ok(list_tables(self.connection()?)?)
    }

    pub fn describe(&self, table: &str) -> Result<Vec<ColumnDef>, SessionError> {
        Ok(describe(self.connection()?, table)?)
    }

    /// Inspect `table`, read all its rows and start a fresh ledger.
    ///
    /// The table is tracked under its stored spelling, whatever the case of
    /// `table`.
    ///
    /// On failure the previous state, including any loaded table, is kept.
    pub fn load_table(&mut self, table: &str) -> Result<(), SessionError> {
        let conn = self.connection()?;
        let table = table_name(conn, table)?;
        let columns = describe(conn, &table)?;
        let rows = load_rows(conn, &table, &columns)?;

        let mut tracker = EditTracker::new();
        tracker.load(&table, columns.clone(), &self.settings.identity(), rows)?;
        let identity = tracker
            .identity_column()
            .cloned()
            .ok_or(TrackerError::NotLoaded)?;
        log::info!(
            "Loaded {} ({} rows, keyed by {})",
            table,
            tracker.rows().len(),
            identity.name
        );

        let loaded = Box::new(LoadedTable {
            tracker,
            target: CommitTarget {
                table,
                columns,
                identity,
            },
        });
        self.state = match std::mem::replace(&mut self.state, State::Closed) {
            State::Opened(conn) | State::Loaded(conn, _) => State::Loaded(conn, loaded),
            State::Closed => State::Closed,
        };
        Ok(())
    }

    /// Reload the current table from the store, clearing the ledger.
    pub fn reload(&mut self) -> Result<(), SessionError> {
        let table = self.loaded()?.1.target.table.clone();
        self.load_table(&table)
    }

    /// Reload the current table, keeping the ledger entries that failed in
    /// `report`.
    pub fn retain_failures(&mut self, report: &CommitReport) -> Result<(), SessionError> {
        let (conn, loaded) = self.loaded_mut()?;
        let rows = load_rows(conn, &loaded.target.table, &loaded.target.columns)?;
        loaded.tracker.reload_retaining_failures(rows, report)?;
        Ok(())
    }

    /// The tracker of the loaded table, for rendering the working view.
    pub fn tracker(&self) -> Option<&EditTracker> {
        self.loaded().ok().map(|(_, loaded)| &loaded.tracker)
    }

    pub fn table(&self) -> Option<&str> {
        self.loaded().ok().map(|(_, loaded)| loaded.target.table.as_str())
    }

    /// An operator changed the text of one cell.
    pub fn on_cell_edit(
        &mut self,
        identity: &RowIdentity,
        column_index: usize,
        text: &str,
    ) -> Result<(), SessionError> {
        let (_, loaded) = self.loaded_mut()?;
        let count = loaded.target.columns.len();
        let column = loaded
            .target
            .columns
            .get(column_index)
            .ok_or(SessionError::ColumnIndex {
                index: column_index,
                count,
            })?;
        let value = CellValue::from_input(text, column.affinity());
        loaded
            .tracker
            .record_cell_edit(identity, &column.name, value)?;
        Ok(())
    }

    /// An operator appended a row. `values` are in column order.
    pub fn on_request_new_row(&mut self, values: &[String]) -> Result<RowIdentity, SessionError> {
        let (_, loaded) = self.loaded_mut()?;
        let columns = &loaded.target.columns;
        if values.len() != columns.len() {
            return Err(TrackerError::RowWidth {
                expected: columns.len(),
                actual: values.len(),
            }
            .into());
        }
        let typed = columns
            .iter()
            .zip(values)
            .map(|(column, text)| CellValue::from_input(text, column.affinity()))
            .collect();
        Ok(loaded.tracker.record_new_row(typed)?)
    }

    /// An operator marked rows for deletion.
    ///
    /// Every identity is checked before any is recorded, so one unknown row
    /// leaves the ledger untouched.
    pub fn on_request_delete(&mut self, identities: &[RowIdentity]) -> Result<(), SessionError> {
        let (_, loaded) = self.loaded_mut()?;
        if let Some(missing) = identities.iter().find(|id| loaded.tracker.row(id).is_none()) {
            return Err(TrackerError::UnknownRow(missing.clone()).into());
        }
        for identity in identities {
            loaded.tracker.record_deletion(identity)?;
        }
        Ok(())
    }

    /// The plan a commit would apply right now.
    pub fn plan(&self) -> Result<ReconciliationPlan, SessionError> {
        Ok(self.loaded()?.1.tracker.build_plan()?)
    }

    /// Apply the ledger to the store.
    ///
    /// The ledger is left as it was; follow up with [`Session::reload`] or
    /// [`Session::retain_failures`].
    pub fn on_request_commit(&mut self) -> Result<CommitReport, SessionError> {
        let (conn, loaded) = self.loaded()?;
        let plan = loaded.tracker.build_plan()?;
        if plan.is_empty() {
            log::info!("Nothing to commit");
            return Ok(CommitReport::default());
        }
        Ok(tabledit_db::commit(conn, &loaded.target, &plan)?)
    }

    /// Drop pending changes and deletions.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        let (_, loaded) = self.loaded_mut()?;
        loaded.tracker.discard()?;
        Ok(())
    }

    /// Find a row by the display form of its identity, e.g. `"42"` or `"new#0"`.
    pub fn find_row(&self, text: &str) -> Option<RowIdentity> {
        let tracker = self.tracker()?;
        tracker
            .rows()
            .iter()
            .map(|row| &row.identity)
            .find(|identity| match identity {
                RowIdentity::Stored(value) => value.display_string() == text,
                RowIdentity::New(id) => id.to_string() == text,
            })
            .cloned()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
