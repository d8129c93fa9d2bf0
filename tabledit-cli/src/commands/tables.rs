use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::commands::Globals;
use crate::error::CliError;

pub(crate) fn run_tables(globals: &Globals, db: Option<PathBuf>) -> Result<(), CliError> {
    let session = globals.open_session(db)?;
    let tables = session.tables()?;

    if tables.is_empty() {
        log::info!("{}", "No tables".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    for table in &tables {
        let rows = tabledit_db::row_count(session.connection()?, table)
            .map_err(tabledit_lib::SessionError::from)?;
        log::info!(
            "{} {}",
            table.if_supports_color(Stdout, |t| t.bold()),
            format!("({} rows)", rows).if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}
