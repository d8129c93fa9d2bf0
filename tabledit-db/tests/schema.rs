use tabledit_db::*;

fn users_db() -> rusqlite::Connection {
    let conn = open_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             name TEXT NOT NULL,
             age INTEGER DEFAULT 18
         );
         CREATE TABLE memberships (
             user_id INTEGER NOT NULL,
             group_id INTEGER NOT NULL,
             role,
             PRIMARY KEY (group_id, user_id)
         );
         CREATE VIEW adults AS SELECT name, age FROM users WHERE age >= 18;
         INSERT INTO users (name, age) VALUES ('Ann', 30);",
    )
    .unwrap();
    conn
}

#[test]
fn describe_returns_columns_in_declared_order() {
    let conn = users_db();
    let columns = describe(&conn, "users").unwrap();

    let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "age"]);

    assert!(columns[0].is_primary_key());
    assert_eq!(columns[0].declared_type, "INTEGER");
    assert!(columns[1].not_null);
    assert!(!columns[1].is_primary_key());
    assert_eq!(columns[2].default_value.as_deref(), Some("18"));
}

#[test]
fn describe_reports_composite_key_ordinals() {
    let conn = users_db();
    let columns = describe(&conn, "memberships").unwrap();

    assert_eq!(columns[0].primary_key_ordinal, Some(2));
    assert_eq!(columns[1].primary_key_ordinal, Some(1));
    assert_eq!(columns[2].primary_key_ordinal, None);
    // untyped column
    assert_eq!(columns[2].declared_type, "");
}

#[test]
fn describe_works_on_views() {
    let conn = users_db();
    let columns = describe(&conn, "adults").unwrap();
    assert_eq!(columns.len(), 2);
}

#[test]
fn describe_missing_table_fails() {
    let conn = users_db();
    let err = describe(&conn, "nope").unwrap_err();
    assert!(matches!(err, SchemaError::TableNotFound(ref t) if t == "nope"));
}

#[test]
fn describe_does_not_interpolate_name() {
    let conn = users_db();
    let err = describe(&conn, "users; DROP TABLE users").unwrap_err();
    assert!(matches!(err, SchemaError::TableNotFound(_)));
    assert!(describe(&conn, "users").is_ok());
}

#[test]
fn list_tables_skips_internal_tables() {
    let conn = users_db();
    // AUTOINCREMENT creates sqlite_sequence
    let tables = list_tables(&conn).unwrap();
    assert_eq!(tables, vec!["memberships", "users"]);
}

#[test]
fn open_database_requires_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");
    let err = open_database(&path, &StoreOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::DatabaseNotFound(_)));
    assert!(!path.exists());
}

#[test]
fn open_database_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE t (a INTEGER, b TEXT);")
            .unwrap();
    }

    let conn = open_database(&path, &StoreOptions::default()).unwrap();
    assert_eq!(list_tables(&conn).unwrap(), vec!["t"]);

    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn load_rows_keeps_storage_classes() {
    use tabledit_core::CellValue;

    let conn = users_db();
    conn.execute(
        "INSERT INTO memberships (user_id, group_id, role) VALUES (1, 2, x'0102')",
        [],
    )
    .unwrap();

    let columns = describe(&conn, "users").unwrap();
    let rows = load_rows(&conn, "users", &columns).unwrap();
    assert_eq!(
        rows,
        vec![vec![
            CellValue::Integer(1),
            CellValue::Text("Ann".into()),
            CellValue::Integer(30),
        ]]
    );

    let columns = describe(&conn, "memberships").unwrap();
    let rows = load_rows(&conn, "memberships", &columns).unwrap();
    assert_eq!(rows[0][2], CellValue::Blob(vec![1, 2]));
    assert_eq!(row_count(&conn, "memberships").unwrap(), 1);
}

#[test]
fn load_rows_rejects_unknown_column() {
    let conn = users_db();
    let mut columns = describe(&conn, "users").unwrap();
    columns[1].name = "name FROM users; --".into();
    assert!(load_rows(&conn, "users", &columns).is_err());
}

#[test]
fn table_lookup_ignores_case() {
    let conn = users_db();
    assert_eq!(table_name(&conn, "USERS").unwrap(), "users");
    assert_eq!(table_name(&conn, "Adults").unwrap(), "adults");

    let columns = describe(&conn, "Users").unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(load_rows(&conn, "USERS", &columns).unwrap().len(), 1);
}
