//! Column metadata and the identity-column rule.

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::value::TypeAffinity;

/// One column of a table, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    /// Declared type as written in the table definition (may be empty).
    pub declared_type: String,
    pub not_null: bool,
    /// 1-based position within the primary key, `None` if not part of it.
    pub primary_key_ordinal: Option<u32>,
    /// Default expression text, if any.
    pub default_value: Option<String>,
}

impl ColumnDef {
    /// A nullable, non-key column.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            not_null: false,
            primary_key_ordinal: None,
            default_value: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key_ordinal = Some(1);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key_ordinal.is_some()
    }

    pub fn affinity(&self) -> TypeAffinity {
        TypeAffinity::from_declared_type(&self.declared_type)
    }
}

/// Which column addresses rows for update and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityColumn {
    /// Declared primary key (lowest ordinal), else the first column.
    #[default]
    Auto,
    /// Always the first column, whatever the key declaration says.
    FirstColumn,
    /// A specific column by name.
    Named(String),
}

impl IdentityColumn {
    /// Resolve the rule against a column list.
    pub fn resolve(&self, columns: &[ColumnDef]) -> Result<ResolvedIdentity, TrackerError> {
        if columns.is_empty() {
            return Err(TrackerError::NoColumns);
        }

        let index = match self {
            Self::Auto => columns
                .iter()
                .enumerate()
                .filter_map(|(i, c)| c.primary_key_ordinal.map(|ord| (ord, i)))
                .min()
                .map_or(0, |(_, i)| i),
            Self::FirstColumn => 0,
            Self::Named(name) => columns
                .iter()
                .position(|c| c.name == *name)
                .ok_or_else(|| TrackerError::UnknownIdentityColumn(name.clone()))?,
        };

        Ok(ResolvedIdentity {
            index,
            name: columns[index].name.clone(),
        })
    }
}

impl std::str::FromStr for IdentityColumn {
    type Err = std::convert::Infallible;

    /// `auto` and `first` select the built-in rules; anything else names a column.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "auto" => Self::Auto,
            "first" | "first-column" => Self::FirstColumn,
            other => Self::Named(other.to_string()),
        })
    }
}

impl std::fmt::Display for IdentityColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::FirstColumn => write!(f, "first"),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

/// The identity column chosen for a loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    pub index: usize,
    pub name: String,
}
