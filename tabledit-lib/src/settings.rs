//! Shared settings (default database, busy timeout, identity rule).
//!
//! The settings file is always `~/.config/tabledit/settings.toml`. Values
//! resolve with the priority CLI flag > environment > settings file >
//! built-in default.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabledit_core::IdentityColumn;
use tabledit_db::StoreOptions;

/// Environment variable naming the database file.
pub const DB_ENV: &str = "TABLEDIT_DB";
/// Environment variable overriding the identity rule.
pub const IDENTITY_ENV: &str = "TABLEDIT_IDENTITY";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub editor: EditorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub default_path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            default_path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// `auto`, `first` or a column name.
    pub identity: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            identity: IdentityColumn::Auto.to_string(),
        }
    }
}

impl Settings {
    /// Settings from the shared file with environment overrides applied.
    pub fn load() -> Self {
        let mut settings = Self::load_from(&settings_path());
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings
    }

    /// Parse a settings file. A missing or malformed file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply environment-style overrides. `lookup` returns the value of a
    /// variable, if set; empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup(DB_ENV).filter(|v| !v.is_empty()) {
            self.database.default_path = Some(PathBuf::from(db));
        }
        if let Some(identity) = lookup(IDENTITY_ENV).filter(|v| !v.is_empty()) {
            self.editor.identity = identity;
        }
    }

    pub fn identity(&self) -> IdentityColumn {
        // FromStr for IdentityColumn cannot fail
        self.editor.identity.parse().unwrap_or_default()
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            busy_timeout: Duration::from_millis(self.database.busy_timeout_ms),
        }
    }

    /// Resolve the database path: CLI override first, then the configured
    /// default (which already includes the environment override).
    pub fn resolve_database(&self, cli_override: Option<PathBuf>) -> Option<PathBuf> {
        cli_override.or_else(|| self.database.default_path.clone())
    }
}

/// Canonical path to the settings file: `~/.config/tabledit/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("tabledit").join("settings.toml")
}

/// Save (or clear) `database.default_path` in the shared settings file.
pub fn save_database_path(path: Option<&Path>) -> io::Result<()> {
    save_database_path_to(&settings_path(), path)
}

pub fn save_database_path_to(settings: &Path, path: Option<&Path>) -> io::Result<()> {
    let value = path.map(|p| toml::Value::String(p.to_string_lossy().into_owned()));
    update_key(settings, "database", "default_path", value)
}

/// Save (or reset to `auto`) `editor.identity` in the shared settings file.
pub fn save_identity(identity: Option<&IdentityColumn>) -> io::Result<()> {
    save_identity_to(&settings_path(), identity)
}

pub fn save_identity_to(settings: &Path, identity: Option<&IdentityColumn>) -> io::Result<()> {
    let value = identity
        .filter(|rule| **rule != IdentityColumn::Auto)
        .map(|rule| toml::Value::String(rule.to_string()));
    update_key(settings, "editor", "identity", value)
}

/// Set or remove `[section] key` in a settings file, leaving every other key
/// as written. A file that does not parse is left untouched and reported as
/// `InvalidData`.
fn update_key(
    settings: &Path,
    section: &str,
    key: &str,
    value: Option<toml::Value>,
) -> io::Result<()> {
    let mut doc = match std::fs::read_to_string(settings) {
        Ok(contents) => contents.parse::<toml::Table>().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{}: {}", settings.display(), e),
            )
        })?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => toml::Table::new(),
        Err(e) => return Err(e),
    };

    let entry = doc
        .entry(section)
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let table = entry
        .as_table_mut()
        .ok_or_else(|| io::Error::other(format!("[{}] is not a table", section)))?;
    match value {
        Some(v) => {
            table.insert(key.to_string(), v);
        }
        None => {
            table.remove(key);
        }
    }
    if table.is_empty() {
        doc.remove(section);
    }

    write_atomic(settings, &toml::to_string_pretty(&doc).map_err(io::Error::other)?)
}

/// Write through a temp file and rename, so readers never see a partial file.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
