//! Opening databases and inspecting table schemas.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension};
use tabledit_core::ColumnDef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("No column metadata available for '{0}'")]
    Unsupported(String),
    #[error("Database file not found: {}", .0.display())]
    DatabaseNotFound(PathBuf),
}

/// Connection settings applied when a database is opened.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long SQLite waits on a locked database before failing a statement.
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// Open an existing database file.
///
/// Unlike `Connection::open`, a missing file is an error rather than a new
/// empty database.
pub fn open_database(path: &Path, options: &StoreOptions) -> Result<Connection, SchemaError> {
    if !path.exists() {
        return Err(SchemaError::DatabaseNotFound(path.to_path_buf()));
    }

    let conn = Connection::open(path)?;
    configure(&conn, options)?;
    log::debug!("Opened database {}", path.display());
    Ok(conn)
}

/// Open an empty in-memory database. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    configure(&conn, &StoreOptions::default())?;
    Ok(conn)
}

fn configure(conn: &Connection, options: &StoreOptions) -> Result<(), SchemaError> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    conn.busy_timeout(options.busy_timeout)?;
    Ok(())
}

/// List user tables in name order. SQLite's internal tables are excluded.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>, SchemaError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
         ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// The name of a table or view as stored in the schema.
///
/// SQLite matches identifiers without regard to ASCII case, so `USERS` finds
/// `users`.
pub fn table_name(conn: &Connection, table: &str) -> Result<String, SchemaError> {
    conn.query_row(
        "SELECT name FROM sqlite_master
         WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE",
        [table],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| SchemaError::TableNotFound(table.to_string()))
}

/// Column definitions of a table (or view), in declared order.
///
/// The table name is only ever bound as a parameter here, so any string is
/// safe to pass.
pub fn describe(conn: &Connection, table: &str) -> Result<Vec<ColumnDef>, SchemaError> {
    let stored = table_name(conn, table)?;

    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk
         FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let rows = stmt.query_map([&stored], |row| {
        let pk: i64 = row.get(4)?;
        Ok(ColumnDef {
            name: row.get(0)?,
            declared_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            not_null: row.get::<_, i64>(2)? != 0,
            primary_key_ordinal: u32::try_from(pk).ok().filter(|&ord| ord > 0),
            default_value: row.get(3)?,
        })
    })?;
    let columns = rows.collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(SchemaError::Unsupported(table.to_string()));
    }
    Ok(columns)
}
