pub(crate) mod config;
pub(crate) mod describe;
pub(crate) mod edit;
pub(crate) mod show;
pub(crate) mod tables;

use std::path::PathBuf;

use tabledit_lib::{Session, Settings};

use crate::error::CliError;

/// Flags shared by every subcommand.
pub(crate) struct Globals {
    pub db: Option<PathBuf>,
    pub key: Option<String>,
}

impl Globals {
    /// Settings with environment overrides, then CLI flags, applied.
    pub(crate) fn settings(&self) -> Settings {
        let mut settings = Settings::load();
        if let Some(key) = &self.key {
            settings.editor.identity = key.clone();
        }
        settings
    }

    /// Open a session on the resolved database. A positional path wins over
    /// `--db`.
    pub(crate) fn open_session(&self, positional: Option<PathBuf>) -> Result<Session, CliError> {
        let settings = self.settings();
        let path = settings
            .resolve_database(positional.or_else(|| self.db.clone()))
            .ok_or_else(|| {
                CliError::config(
                    "no database given (pass a path or --db, set TABLEDIT_DB, \
                     or set database.default_path in settings.toml)",
                )
            })?;

        let mut session = Session::new(settings);
        session.open(&path)?;
        Ok(session)
    }
}

/// `[DB] TABLE` positional pair.
pub(crate) struct Target {
    pub db: Option<PathBuf>,
    pub table: String,
}

impl Target {
    pub(crate) fn parse(mut args: Vec<String>) -> Result<Self, CliError> {
        let table = args
            .pop()
            .ok_or_else(|| CliError::usage("missing table name"))?;
        Ok(Self {
            db: args.pop().map(PathBuf::from),
            table,
        })
    }
}

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max).collect()
    }
}
