//! SQL text for reconciliation statements.
//!
//! Table and column names are interpolated into statement text, so every
//! name goes through [`ValidatedTable`] first: only names reported by the
//! schema inspector are accepted, and they are emitted as quoted
//! identifiers. Values are always bound parameters.

use rusqlite::ParamsFromIter;
use tabledit_core::{CellValue, ColumnDef, RowInsert, RowUpdate};
use thiserror::Error;

use crate::queries::cell_to_sql;

#[derive(Debug, Error)]
#[error("Invalid identifier '{0}': not part of the inspected table schema")]
pub struct InvalidIdentifier(pub String);

/// Quote an identifier for SQLite, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// The set of identifiers a statement may mention for one table.
#[derive(Debug, Clone)]
pub struct ValidatedTable {
    table: String,
    columns: Vec<String>,
}

impl ValidatedTable {
    /// Build from the inspected column list of `table`.
    pub fn new(table: &str, columns: &[ColumnDef]) -> Self {
        Self {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.name.clone()).collect(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Look up a column name, returning the inspected spelling.
    pub fn column(&self, name: &str) -> Result<&str, InvalidIdentifier> {
        self.columns
            .iter()
            .find(|c| *c == name)
            .map(String::as_str)
            .ok_or_else(|| InvalidIdentifier(name.to_string()))
    }
}

/// SQL text plus its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<CellValue>,
}

impl Statement {
    pub fn bind(&self) -> ParamsFromIter<impl Iterator<Item = rusqlite::types::Value> + '_> {
        rusqlite::params_from_iter(self.params.iter().map(cell_to_sql))
    }
}

pub fn delete_statement(
    table: &ValidatedTable,
    identity_column: &str,
    identity: &CellValue,
) -> Result<Statement, InvalidIdentifier> {
    let key = table.column(identity_column)?;
    Ok(Statement {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_ident(table.table()),
            quote_ident(key)
        ),
        params: vec![identity.clone()],
    })
}

/// `UPDATE` over exactly the touched columns. `None` when nothing changed.
pub fn update_statement(
    table: &ValidatedTable,
    identity_column: &str,
    update: &RowUpdate,
) -> Result<Option<Statement>, InvalidIdentifier> {
    if update.changes.is_empty() {
        return Ok(None);
    }

    let key = table.column(identity_column)?;
    let mut assignments = Vec::with_capacity(update.changes.len());
    let mut params = Vec::with_capacity(update.changes.len() + 1);
    for (column, value) in update.changes.iter() {
        assignments.push(format!("{} = ?", quote_ident(table.column(column)?)));
        params.push(value.clone());
    }
    params.push(update.identity.clone());

    Ok(Some(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_ident(table.table()),
            assignments.join(", "),
            quote_ident(key)
        ),
        params,
    }))
}

/// `INSERT` over all declared columns, empty strings bound as NULL.
/// `None` when every value is blank.
pub fn insert_statement(
    table: &ValidatedTable,
    columns: &[ColumnDef],
    insert: &RowInsert,
) -> Result<Option<Statement>, InvalidIdentifier> {
    if insert.is_blank() {
        return Ok(None);
    }

    let names = columns
        .iter()
        .map(|c| table.column(&c.name).map(quote_ident))
        .collect::<Result<Vec<_>, _>>()?;
    let params = insert
        .values
        .iter()
        .map(|v| match v {
            CellValue::Text(s) if s.is_empty() => CellValue::Null,
            other => other.clone(),
        })
        .collect::<Vec<_>>();
    let placeholders = vec!["?"; names.len()].join(", ");

    Ok(Some(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table.table()),
            names.join(", "),
            placeholders
        ),
        params,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabledit_core::{ColumnChanges, NewRowId};

    fn users() -> (ValidatedTable, Vec<ColumnDef>) {
        let columns = vec![
            ColumnDef::new("id", "INTEGER").primary_key(),
            ColumnDef::new("name", "TEXT"),
            ColumnDef::new("age", "INTEGER"),
        ];
        (ValidatedTable::new("users", &columns), columns)
    }

    #[test]
    fn update_lists_only_touched_columns() {
        let (table, _) = users();
        let update = RowUpdate {
            identity: CellValue::Integer(1),
            changes: [("age", CellValue::Text("31".into()))].into_iter().collect(),
        };
        let stmt = update_statement(&table, "id", &update).unwrap().unwrap();
        assert_eq!(stmt.sql, r#"UPDATE "users" SET "age" = ? WHERE "id" = ?"#);
        assert_eq!(
            stmt.params,
            vec![CellValue::Text("31".into()), CellValue::Integer(1)]
        );
    }

    #[test]
    fn update_keeps_change_order() {
        let (table, _) = users();
        let update = RowUpdate {
            identity: CellValue::Integer(2),
            changes: [
                ("name", CellValue::Text("Bo".into())),
                ("age", CellValue::Integer(9)),
            ]
            .into_iter()
            .collect(),
        };
        let stmt = update_statement(&table, "id", &update).unwrap().unwrap();
        assert_eq!(
            stmt.sql,
            r#"UPDATE "users" SET "name" = ?, "age" = ? WHERE "id" = ?"#
        );
    }

    #[test]
    fn empty_update_is_no_statement() {
        let (table, _) = users();
        let update = RowUpdate {
            identity: CellValue::Integer(1),
            changes: ColumnChanges::new(),
        };
        assert!(update_statement(&table, "id", &update).unwrap().is_none());
    }

    #[test]
    fn unknown_column_is_rejected() {
        let (table, _) = users();
        let update = RowUpdate {
            identity: CellValue::Integer(1),
            changes: [("age = 0; DROP TABLE users; --", CellValue::Null)]
                .into_iter()
                .collect(),
        };
        let err = update_statement(&table, "id", &update).unwrap_err();
        assert_eq!(err.0, "age = 0; DROP TABLE users; --");
        assert!(delete_statement(&table, "rowid", &CellValue::Integer(1)).is_err());
    }

    #[test]
    fn delete_binds_identity() {
        let (table, _) = users();
        let stmt = delete_statement(&table, "id", &CellValue::Integer(7)).unwrap();
        assert_eq!(stmt.sql, r#"DELETE FROM "users" WHERE "id" = ?"#);
        assert_eq!(stmt.params, vec![CellValue::Integer(7)]);
    }

    #[test]
    fn insert_normalizes_empty_strings() {
        let (table, columns) = users();
        let insert = RowInsert {
            id: NewRowId(0),
            values: vec!["".into(), "Cid".into(), CellValue::Null],
        };
        let stmt = insert_statement(&table, &columns, &insert).unwrap().unwrap();
        assert_eq!(
            stmt.sql,
            r#"INSERT INTO "users" ("id", "name", "age") VALUES (?, ?, ?)"#
        );
        assert_eq!(
            stmt.params,
            vec![CellValue::Null, CellValue::Text("Cid".into()), CellValue::Null]
        );
    }

    #[test]
    fn blank_insert_is_no_statement() {
        let (table, columns) = users();
        let insert = RowInsert {
            id: NewRowId(0),
            values: vec!["".into(), "".into(), CellValue::Null],
        };
        assert!(insert_statement(&table, &columns, &insert).unwrap().is_none());
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }
}
