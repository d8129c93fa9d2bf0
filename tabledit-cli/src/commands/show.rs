use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::commands::{truncate_str, Globals, Target};
use crate::error::CliError;

const MAX_CELL_WIDTH: usize = 32;

pub(crate) fn run_show(globals: &Globals, target: Target, limit: Option<usize>) -> Result<(), CliError> {
    let mut session = globals.open_session(target.db)?;
    session.load_table(&target.table)?;
    let Some(tracker) = session.tracker() else {
        return Ok(());
    };

    let headers: Vec<String> = tracker.columns().iter().map(|c| c.name.clone()).collect();
    let total = tracker.rows().len();
    let rows: Vec<Vec<String>> = tracker
        .rows()
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|row| {
            row.display_values()
                .iter()
                .map(|v| truncate_str(v, MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let pad = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    log::info!("{}", pad(&headers).if_supports_color(Stdout, |t| t.bold()));
    for row in &rows {
        log::info!("{}", pad(row));
    }
    if rows.len() < total {
        log::info!(
            "{}",
            format!("... {} more rows", total - rows.len()).if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}
