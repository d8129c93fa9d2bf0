use super::*;
use crate::report::ErrorKind;

fn users_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("id", "INTEGER").primary_key(),
        ColumnDef::new("name", "TEXT").not_null(),
        ColumnDef::new("age", "INTEGER"),
    ]
}

fn users_rows() -> Vec<Vec<CellValue>> {
    vec![
        vec![1.into(), "Ann".into(), 30.into()],
        vec![2.into(), "Bob".into(), 41.into()],
    ]
}

fn loaded_users() -> EditTracker {
    let mut tracker = EditTracker::new();
    tracker
        .load("users", users_columns(), &IdentityColumn::Auto, users_rows())
        .unwrap();
    tracker
}

fn stored(id: i64) -> RowIdentity {
    RowIdentity::Stored(CellValue::Integer(id))
}

#[test]
fn load_then_plan_is_empty() {
    let tracker = loaded_users();
    let plan = tracker.build_plan().unwrap();
    assert!(plan.to_delete.is_empty());
    assert!(plan.to_update.is_empty());
    assert!(plan.to_insert.is_empty());
    assert!(!tracker.is_dirty());
}

#[test]
fn mutations_before_load_fail() {
    let mut tracker = EditTracker::new();
    assert!(matches!(
        tracker.record_cell_edit(&stored(1), "age", 31.into()),
        Err(TrackerError::NotLoaded)
    ));
    assert!(matches!(
        tracker.record_new_row(vec![]),
        Err(TrackerError::NotLoaded)
    ));
    assert!(matches!(
        tracker.record_deletion(&stored(1)),
        Err(TrackerError::NotLoaded)
    ));
    assert!(matches!(tracker.build_plan(), Err(TrackerError::NotLoaded)));
}

#[test]
fn single_edit_becomes_sparse_update() {
    let mut tracker = loaded_users();
    tracker
        .record_cell_edit(&stored(1), "age", "31".into())
        .unwrap();

    let plan = tracker.build_plan().unwrap();
    assert_eq!(plan.to_update.len(), 1);
    let update = &plan.to_update[0];
    assert_eq!(update.identity, CellValue::Integer(1));
    assert_eq!(update.changes.len(), 1);
    assert_eq!(update.changes.get("age"), Some(&CellValue::Text("31".into())));
    assert!(tracker.is_dirty());
}

#[test]
fn last_write_wins() {
    let mut tracker = loaded_users();
    for age in [31, 32, 33] {
        tracker
            .record_cell_edit(&stored(1), "age", age.into())
            .unwrap();
    }
    tracker
        .record_cell_edit(&stored(1), "name", "Anne".into())
        .unwrap();
    tracker
        .record_cell_edit(&stored(1), "age", 34.into())
        .unwrap();

    let plan = tracker.build_plan().unwrap();
    let changes: Vec<_> = plan.to_update[0].changes.iter().collect();
    assert_eq!(
        changes,
        vec![
            ("age", &CellValue::Integer(34)),
            ("name", &CellValue::Text("Anne".into())),
        ]
    );
}

#[test]
fn deletion_wins_over_earlier_edit() {
    let mut tracker = loaded_users();
    tracker
        .record_cell_edit(&stored(1), "name", "Anne".into())
        .unwrap();
    tracker.record_deletion(&stored(1)).unwrap();

    let plan = tracker.build_plan().unwrap();
    assert_eq!(plan.to_delete, vec![CellValue::Integer(1)]);
    assert!(plan.to_update.is_empty());
    assert!(tracker.pending_changes(&stored(1)).is_none());
}

#[test]
fn deletion_wins_over_later_edit() {
    let mut tracker = loaded_users();
    tracker.record_deletion(&stored(2)).unwrap();
    tracker
        .record_cell_edit(&stored(2), "age", 50.into())
        .unwrap();

    let plan = tracker.build_plan().unwrap();
    assert_eq!(plan.to_delete, vec![CellValue::Integer(2)]);
    assert!(plan.to_update.iter().all(|u| u.identity != CellValue::Integer(2)));
}

#[test]
fn new_row_goes_to_insert_in_column_order() {
    let mut tracker = loaded_users();
    let values: Vec<CellValue> = vec![CellValue::Null, "Cid".into(), 22.into()];
    let identity = tracker.record_new_row(values.clone()).unwrap();
    assert!(identity.is_new());

    let plan = tracker.build_plan().unwrap();
    assert_eq!(plan.to_insert.len(), 1);
    assert_eq!(plan.to_insert[0].values, values);
    assert!(plan.to_update.is_empty());
}

#[test]
fn new_row_edits_apply_in_place() {
    let mut tracker = loaded_users();
    let identity = tracker
        .record_new_row(vec![CellValue::Null, "Cid".into(), CellValue::Null])
        .unwrap();
    tracker
        .record_cell_edit(&identity, "age", 19.into())
        .unwrap();

    assert_eq!(
        tracker.row(&identity).unwrap().values[2],
        CellValue::Integer(19)
    );
    assert!(tracker.pending_changes(&identity).is_none());
    let plan = tracker.build_plan().unwrap();
    assert_eq!(plan.to_insert[0].values[2], CellValue::Integer(19));
}

#[test]
fn new_rows_get_distinct_sentinels() {
    let mut tracker = loaded_users();
    let a = tracker
        .record_new_row(vec![CellValue::Null, "A".into(), CellValue::Null])
        .unwrap();
    let b = tracker
        .record_new_row(vec![CellValue::Null, "B".into(), CellValue::Null])
        .unwrap();
    assert_ne!(a, b);

    tracker.record_cell_edit(&b, "name", "Bea".into()).unwrap();
    let plan = tracker.build_plan().unwrap();
    assert_eq!(plan.to_insert[0].values[1], CellValue::Text("A".into()));
    assert_eq!(plan.to_insert[1].values[1], CellValue::Text("Bea".into()));
}

#[test]
fn blank_new_row_is_left_out() {
    let mut tracker = loaded_users();
    tracker
        .record_new_row(vec!["".into(), "".into(), "".into()])
        .unwrap();
    let plan = tracker.build_plan().unwrap();
    assert!(plan.to_insert.is_empty());
}

#[test]
fn deleted_new_row_is_neither_inserted_nor_deleted() {
    let mut tracker = loaded_users();
    let identity = tracker
        .record_new_row(vec![CellValue::Null, "Cid".into(), CellValue::Null])
        .unwrap();
    tracker.record_deletion(&identity).unwrap();

    let plan = tracker.build_plan().unwrap();
    assert!(plan.is_empty());
}

#[test]
fn empty_change_set_is_omitted() {
    let mut tracker = loaded_users();
    tracker.record_deletion(&stored(1)).unwrap();
    tracker.discard().unwrap();
    let plan = tracker.build_plan().unwrap();
    assert!(plan.is_empty());
}

#[test]
fn unknown_column_and_row_are_rejected() {
    let mut tracker = loaded_users();
    assert!(matches!(
        tracker.record_cell_edit(&stored(1), "email", "x".into()),
        Err(TrackerError::UnknownColumn { .. })
    ));
    assert!(matches!(
        tracker.record_cell_edit(&stored(99), "age", 1.into()),
        Err(TrackerError::UnknownRow(_))
    ));
    assert!(matches!(
        tracker.record_deletion(&stored(99)),
        Err(TrackerError::UnknownRow(_))
    ));
    // Same digits, different storage class
    assert!(matches!(
        tracker.record_deletion(&RowIdentity::Stored("1".into())),
        Err(TrackerError::UnknownRow(_))
    ));
}

#[test]
fn new_row_width_must_match() {
    let mut tracker = loaded_users();
    assert!(matches!(
        tracker.record_new_row(vec!["only one".into()]),
        Err(TrackerError::RowWidth {
            expected: 3,
            actual: 1
        })
    ));
}

#[test]
fn discard_keeps_new_rows() {
    let mut tracker = loaded_users();
    tracker
        .record_cell_edit(&stored(1), "age", 31.into())
        .unwrap();
    tracker.record_deletion(&stored(2)).unwrap();
    tracker
        .record_new_row(vec![CellValue::Null, "Cid".into(), CellValue::Null])
        .unwrap();

    tracker.discard().unwrap();
    let plan = tracker.build_plan().unwrap();
    assert!(plan.to_update.is_empty());
    assert!(plan.to_delete.is_empty());
    assert_eq!(plan.to_insert.len(), 1);
    assert!(tracker.is_dirty());
}

#[test]
fn plan_follows_snapshot_order() {
    let mut tracker = loaded_users();
    tracker
        .record_cell_edit(&stored(2), "age", 42.into())
        .unwrap();
    tracker
        .record_cell_edit(&stored(1), "age", 31.into())
        .unwrap();
    let plan = tracker.build_plan().unwrap();
    let ids: Vec<_> = plan.to_update.iter().map(|u| u.identity.clone()).collect();
    assert_eq!(ids, vec![CellValue::Integer(1), CellValue::Integer(2)]);
}

#[test]
fn identity_follows_primary_key_not_position() {
    let columns = vec![
        ColumnDef::new("name", "TEXT"),
        ColumnDef::new("code", "TEXT").primary_key(),
    ];
    let mut tracker = EditTracker::new();
    tracker
        .load(
            "items",
            columns,
            &IdentityColumn::Auto,
            vec![vec!["Widget".into(), "W-1".into()]],
        )
        .unwrap();

    assert_eq!(tracker.identity_column().unwrap().name, "code");
    assert_eq!(
        tracker.rows()[0].identity,
        RowIdentity::Stored("W-1".into())
    );
}

#[test]
fn working_rows_overlay_changes_and_hide_deletions() {
    let mut tracker = loaded_users();
    tracker
        .record_cell_edit(&stored(1), "age", 31.into())
        .unwrap();
    tracker.record_deletion(&stored(2)).unwrap();

    let rows = tracker.working_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].display_values(), vec!["1", "Ann", "31"]);
    // snapshot itself is untouched
    assert_eq!(tracker.rows()[0].values[2], CellValue::Integer(30));
}

#[test]
fn reload_keeps_only_failed_subset() {
    let mut tracker = loaded_users();
    tracker
        .record_cell_edit(&stored(1), "age", 31.into())
        .unwrap();
    tracker
        .record_cell_edit(&stored(2), "name", CellValue::Null)
        .unwrap();
    let good = tracker
        .record_new_row(vec![CellValue::Null, "Cid".into(), CellValue::Null])
        .unwrap();
    let bad = tracker
        .record_new_row(vec![CellValue::Null, CellValue::Null, 5.into()])
        .unwrap();

    let mut report = CommitReport::default();
    report.record_success(stored(1), Operation::Update);
    report.record_failure(
        stored(2),
        Operation::Update,
        ErrorKind::ConstraintViolation,
        "NOT NULL constraint failed: users.name",
    );
    report.record_success(good, Operation::Insert);
    report.record_failure(
        bad.clone(),
        Operation::Insert,
        ErrorKind::ConstraintViolation,
        "NOT NULL constraint failed: users.name",
    );

    let fresh = vec![
        vec![1.into(), "Ann".into(), 31.into()],
        vec![2.into(), "Bob".into(), 41.into()],
        vec![3.into(), "Cid".into(), CellValue::Null],
    ];
    tracker.reload_retaining_failures(fresh, &report).unwrap();

    assert!(tracker.pending_changes(&stored(1)).is_none());
    assert_eq!(
        tracker.pending_changes(&stored(2)).unwrap().get("name"),
        Some(&CellValue::Null)
    );
    assert_eq!(tracker.rows().len(), 4);
    assert_eq!(tracker.rows()[3].identity, bad);

    let plan = tracker.build_plan().unwrap();
    assert_eq!(plan.to_update.len(), 1);
    assert_eq!(plan.to_insert.len(), 1);
    assert!(tracker.is_dirty());
}

#[test]
fn reload_drops_failed_delete_of_vanished_row() {
    let mut tracker = loaded_users();
    tracker.record_deletion(&stored(2)).unwrap();

    let mut report = CommitReport::default();
    report.record_failure(stored(2), Operation::Delete, ErrorKind::RowNotFound, "no row");

    tracker
        .reload_retaining_failures(vec![vec![1.into(), "Ann".into(), 30.into()]], &report)
        .unwrap();
    assert!(!tracker.is_pending_deletion(&stored(2)));
    assert!(!tracker.is_dirty());
}
