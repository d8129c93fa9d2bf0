use std::path::Path;
use std::process::{Command, Output};

use rusqlite::Connection;

/// Run the binary against an isolated config directory.
fn tabledit(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tabledit"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("TABLEDIT_DB")
        .env_remove("TABLEDIT_IDENTITY")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn sample_db(dir: &Path) -> String {
    let path = dir.join("app.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE t (id INTEGER PRIMARY KEY, a TEXT);
         INSERT INTO t VALUES (1, 'x'), (2, 'z');",
    )
    .unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn json_dry_run_stdout_is_pure_json() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_db(dir.path());

    let out = tabledit(
        dir.path(),
        &["-v", "edit", &db, "t", "--set", "1:a=y", "--delete", "2", "-n", "--json"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let plan: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(plan["to_delete"].as_array().unwrap().len(), 1);
    assert_eq!(plan["to_update"].as_array().unwrap().len(), 1);
    assert!(plan["to_insert"].as_array().unwrap().is_empty());
}

#[test]
fn json_commit_report_is_pure_json() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_db(dir.path());

    let out = tabledit(dir.path(), &["edit", &db, "t", "--set", "1:a=y", "--json"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    serde_json::from_slice::<serde_json::Value>(&out.stdout).unwrap();

    let conn = Connection::open(&db).unwrap();
    let a: String = conn
        .query_row("SELECT a FROM t WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(a, "y");
}

#[test]
fn tables_accepts_global_db_flag() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_db(dir.path());

    let out = tabledit(dir.path(), &["tables", "--db", &db]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("(2 rows)"));
}
