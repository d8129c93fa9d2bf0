//! Whole-table reads and value conversion at the rusqlite boundary.

use rusqlite::types::{Value, ValueRef};
use rusqlite::Connection;
use tabledit_core::{CellValue, ColumnDef};

use crate::schema::SchemaError;
use crate::statements::{quote_ident, ValidatedTable};

/// Read every row of a table, values in the order of `columns`.
///
/// `columns` should come from [`crate::describe`]; names outside the
/// inspected set are rejected before any SQL is built.
pub fn load_rows(
    conn: &Connection,
    table: &str,
    columns: &[ColumnDef],
) -> Result<Vec<Vec<CellValue>>, SchemaError> {
    let described = crate::schema::describe(conn, table)?;
    let validated = ValidatedTable::new(table, &described);
    let mut select = Vec::with_capacity(columns.len());
    for column in columns {
        let name = validated
            .column(&column.name)
            .map_err(|_| SchemaError::Unsupported(format!("{}.{}", table, column.name)))?;
        select.push(quote_ident(name));
    }

    let sql = format!(
        "SELECT {} FROM {}",
        select.join(", "),
        quote_ident(validated.table())
    );
    let mut stmt = conn.prepare(&sql)?;
    let width = columns.len();
    let rows = stmt.query_map([], |row| {
        (0..width)
            .map(|i| row.get_ref(i).map(cell_from_sql))
            .collect::<Result<Vec<_>, _>>()
    })?;
    let rows = rows.collect::<Result<Vec<_>, _>>()?;

    log::debug!("Loaded {} rows from {}", rows.len(), table);
    Ok(rows)
}

/// Count rows in a table.
pub fn row_count(conn: &Connection, table: &str) -> Result<i64, SchemaError> {
    let described = crate::schema::describe(conn, table)?;
    let validated = ValidatedTable::new(table, &described);
    let count = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(validated.table())),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn cell_from_sql(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Real(f),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => CellValue::Blob(bytes.to_vec()),
    }
}

pub fn cell_to_sql(value: &CellValue) -> Value {
    match value {
        CellValue::Null => Value::Null,
        CellValue::Integer(i) => Value::Integer(*i),
        CellValue::Real(f) => Value::Real(*f),
        CellValue::Text(s) => Value::Text(s.clone()),
        CellValue::Blob(b) => Value::Blob(b.clone()),
    }
}
