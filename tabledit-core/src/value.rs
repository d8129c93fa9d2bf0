//! Typed cell values and SQLite type affinity.
//!
//! Values are carried in their stored form from load to commit. Text is only
//! produced for display; operator input is converted back through
//! [`CellValue::from_input`] using the column's affinity.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single cell value, one variant per SQLite storage class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    /// Convert operator-entered text into a typed value for a column.
    ///
    /// Numeric affinities keep the text as-is when it does not parse, the same
    /// way SQLite stores non-numeric text in a numeric column. Empty input is
    /// `Null` everywhere except TEXT columns.
    pub fn from_input(text: &str, affinity: TypeAffinity) -> Self {
        if text.is_empty() {
            return match affinity {
                TypeAffinity::Text => Self::Text(String::new()),
                _ => Self::Null,
            };
        }

        let trimmed = text.trim();
        match affinity {
            TypeAffinity::Text | TypeAffinity::Blob => Self::Text(text.to_string()),
            TypeAffinity::Integer | TypeAffinity::Numeric => {
                if let Ok(i) = trimmed.parse::<i64>() {
                    Self::Integer(i)
                } else if let Some(f) = parse_real(trimmed) {
                    // 3.0 in an INTEGER column is stored as 3
                    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                        Self::Integer(f as i64)
                    } else {
                        Self::Real(f)
                    }
                } else {
                    Self::Text(text.to_string())
                }
            }
            TypeAffinity::Real => match parse_real(trimmed) {
                Some(f) => Self::Real(f),
                None => Self::Text(text.to_string()),
            },
        }
    }

    /// True for `Null` and the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String form used by the grid. `Null` renders as an empty cell.
    pub fn display_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(i) => i.to_string(),
            Self::Real(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
                format!("x'{}'", hex)
            }
        }
    }

    /// Name of the storage class, as reported by SQLite's `typeof()`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }
}

/// Parse a finite real number. `inf`/`NaN` spellings are left as text.
fn parse_real(s: &str) -> Option<f64> {
    let has_digit = s.bytes().any(|b| b.is_ascii_digit());
    if !has_digit {
        return None;
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

// Reals compare by bit pattern so CellValue can key the pending-change map.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Blob(a), Self::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Integer(i) => i.hash(state),
            Self::Real(f) => f.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
            Self::Blob(b) => b.hash(state),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Text(s) => write!(f, "'{}'", s),
            other => write!(f, "{}", other.display_string()),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for CellValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// SQLite column affinity, derived from a declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeAffinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl TypeAffinity {
    /// Apply SQLite's affinity rules to a declared type.
    ///
    /// The rules are checked in order, so `CHARINT` is Integer and
    /// `FLOATING POINT` is Integer (it contains "INT").
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            Self::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Self::Text
        } else if upper.contains("BLOB") || upper.trim().is_empty() {
            Self::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Self::Real
        } else {
            Self::Numeric
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Real => "REAL",
            Self::Numeric => "NUMERIC",
        }
    }
}

impl std::fmt::Display for TypeAffinity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
#[path = "tests/value_tests.rs"]
mod tests;
