//! SQLite side of tabledit.
//!
//! Provides database opening, schema inspection, whole-table loads and the
//! reconciliation engine that applies an edit plan in one transaction
//! (via rusqlite with bundled feature).

pub mod queries;
pub mod reconcile;
pub mod schema;
pub mod statements;

pub use queries::{load_rows, row_count};
pub use reconcile::{classify_error, commit, CommitError, CommitTarget};
pub use schema::{
    describe, list_tables, open_database, open_memory, table_name, SchemaError, StoreOptions,
};
pub use statements::{InvalidIdentifier, Statement, ValidatedTable};
