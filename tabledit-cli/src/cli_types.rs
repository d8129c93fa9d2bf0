//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tabledit")]
#[command(about = "Inspect and edit SQLite tables row by row", long_about = None)]
pub(crate) struct Cli {
    /// Database file (overrides TABLEDIT_DB and settings.toml)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Identity column rule: auto, first, or a column name
    #[arg(short, long, global = true)]
    pub key: Option<String>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug logging (prints every statement)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the tables in a database
    Tables {
        /// Database file
        #[arg(value_name = "DB")]
        path: Option<PathBuf>,
    },

    /// Show the column definitions of a table
    Describe {
        /// [DB] TABLE
        #[arg(required = true, num_args = 1..=2, value_name = "TABLE")]
        target: Vec<String>,
    },

    /// Print the rows of a table
    Show {
        /// [DB] TABLE
        #[arg(required = true, num_args = 1..=2, value_name = "TABLE")]
        target: Vec<String>,

        /// Maximum number of rows to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Edit a table and commit the changes in one transaction
    ///
    /// Inserts are recorded first, so `--set new#0:name=...` can refer to
    /// the first inserted row. Deletions win over edits to the same row.
    Edit {
        /// [DB] TABLE
        #[arg(required = true, num_args = 1..=2, value_name = "TABLE")]
        target: Vec<String>,

        /// Set one cell: ROW:COLUMN=VALUE (ROW is the identity value,
        /// COLUMN a name or zero-based index)
        #[arg(long = "set", value_name = "ROW:COLUMN=VALUE")]
        sets: Vec<String>,

        /// Append a row: comma-separated values in column order
        #[arg(long = "insert", value_name = "V1,V2,..")]
        inserts: Vec<String>,

        /// Delete the row with this identity value
        #[arg(long = "delete", value_name = "ROW")]
        deletes: Vec<String>,

        /// Print the plan without committing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Print the plan or commit report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the settings file and the effective values
    Show,

    /// Print the settings file path
    Path,

    /// Save the default database path (clears it when omitted)
    SetDb {
        path: Option<PathBuf>,
    },

    /// Save the identity column rule: auto, first, or a column name
    /// (resets to auto when omitted)
    SetKey {
        rule: Option<String>,
    },
}

impl Cli {
    /// Commands whose stdout is machine-readable send log records to stderr
    /// so the two never interleave.
    pub fn logs_to_stderr(&self) -> bool {
        matches!(self.command, Commands::Edit { json: true, .. })
    }
}
