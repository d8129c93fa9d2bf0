use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabledit_lib::SessionError;

use crate::commands::{Globals, Target};
use crate::error::CliError;

/// Print column definitions, marking the column rows are addressed by.
pub(crate) fn run_describe(globals: &Globals, target: Target) -> Result<(), CliError> {
    let session = globals.open_session(target.db)?;
    let columns = session.describe(&target.table)?;
    let rule = session.settings().identity();
    let identity = rule.resolve(&columns).map_err(SessionError::from)?;

    log::info!(
        "{} {}",
        target.table.if_supports_color(Stdout, |t| t.bold()),
        format!("(identity: {}, rule {})", identity.name, rule)
            .if_supports_color(Stdout, |t| t.dimmed()),
    );

    let width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for (i, column) in columns.iter().enumerate() {
        let mut flags = Vec::new();
        if let Some(ord) = column.primary_key_ordinal {
            flags.push(format!("PK{}", ord));
        }
        if column.not_null {
            flags.push("NOT NULL".to_string());
        }
        if let Some(default) = &column.default_value {
            flags.push(format!("DEFAULT {}", default));
        }

        let marker = if i == identity.index { "*" } else { " " };
        let declared = if column.declared_type.is_empty() {
            "(none)"
        } else {
            column.declared_type.as_str()
        };
        log::info!(
            "{} {:>2} {:<width$}  {:<12} {:<8} {}",
            marker.if_supports_color(Stdout, |t| t.yellow()),
            i,
            column.name,
            declared.if_supports_color(Stdout, |t| t.cyan()),
            column.affinity().name(),
            flags.join(" "),
            width = width,
        );
    }
    Ok(())
}
