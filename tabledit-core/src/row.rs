use serde::{Deserialize, Serialize};

use crate::value::CellValue;

/// Working-view handle for a row that has not been stored yet.
///
/// Numbers are tracker-local and never reused while the tracker lives, so a
/// failed insert keeps its handle across a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NewRowId(pub u64);

impl std::fmt::Display for NewRowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "new#{}", self.0)
    }
}

/// How a row is addressed in the working view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIdentity {
    /// Loaded from the store; the identity-column value.
    Stored(CellValue),
    /// Added in the working view, no store identity yet.
    New(NewRowId),
}

impl RowIdentity {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }

    pub fn stored_value(&self) -> Option<&CellValue> {
        match self {
            Self::Stored(value) => Some(value),
            Self::New(_) => None,
        }
    }
}

impl From<CellValue> for RowIdentity {
    fn from(value: CellValue) -> Self {
        Self::Stored(value)
    }
}

impl From<NewRowId> for RowIdentity {
    fn from(id: NewRowId) -> Self {
        Self::New(id)
    }
}

impl std::fmt::Display for RowIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored(value) => write!(f, "{}", value),
            Self::New(id) => write!(f, "{}", id),
        }
    }
}

/// A row as held by the tracker, values aligned with the column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSnapshot {
    pub identity: RowIdentity,
    pub values: Vec<CellValue>,
}

impl RowSnapshot {
    pub fn display_values(&self) -> Vec<String> {
        self.values.iter().map(CellValue::display_string).collect()
    }
}
