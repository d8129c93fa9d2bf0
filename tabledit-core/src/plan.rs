//! The insert/update/delete partition handed to the reconciliation engine.

use serde::Serialize;

use crate::row::NewRowId;
use crate::value::CellValue;

/// Sparse column -> value map for one row, in first-touch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnChanges(Vec<(String, CellValue)>);

impl ColumnChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column's new value. A column already present keeps its
    /// position and takes the new value.
    pub fn set(&mut self, column: &str, value: CellValue) {
        match self.0.iter_mut().find(|(name, _)| name == column) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, CellValue)> for ColumnChanges {
    fn from_iter<I: IntoIterator<Item = (S, CellValue)>>(iter: I) -> Self {
        let mut changes = Self::new();
        for (column, value) in iter {
            changes.set(&column.into(), value);
        }
        changes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowUpdate {
    pub identity: CellValue,
    pub changes: ColumnChanges,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowInsert {
    pub id: NewRowId,
    /// Full row in column order.
    pub values: Vec<CellValue>,
}

impl RowInsert {
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(CellValue::is_blank)
    }
}

/// Three disjoint lists, each in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationPlan {
    pub to_delete: Vec<CellValue>,
    pub to_update: Vec<RowUpdate>,
    pub to_insert: Vec<RowInsert>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_update.is_empty() && self.to_insert.is_empty()
    }

    /// Number of statements the plan will produce.
    pub fn len(&self) -> usize {
        self.to_delete.len() + self.to_update.len() + self.to_insert.len()
    }
}
