//! Core types for tabledit: typed cell values, column metadata, the edit
//! tracker and the reconciliation plan it produces.
//!
//! Nothing in this crate touches a database. The store-facing half lives in
//! `tabledit-db`.

pub mod column;
pub mod error;
pub mod plan;
pub mod report;
pub mod row;
pub mod tracker;
pub mod value;

pub use column::{ColumnDef, IdentityColumn, ResolvedIdentity};
pub use error::TrackerError;
pub use plan::{ColumnChanges, ReconciliationPlan, RowInsert, RowUpdate};
pub use report::{CommitReport, ErrorKind, Operation, RowFailure, RowOutcome};
pub use row::{NewRowId, RowIdentity, RowSnapshot};
pub use tracker::EditTracker;
pub use value::{CellValue, TypeAffinity};
