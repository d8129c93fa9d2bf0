use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabledit_core::IdentityColumn;
use tabledit_lib::settings::{self, DB_ENV, IDENTITY_ENV};

use crate::commands::Globals;
use crate::error::CliError;

/// Show the settings file and the values a command would use.
pub(crate) fn run_config_show(globals: &Globals) {
    let path = settings::settings_path();

    log::info!(
        "{}",
        "tabledit Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if let Some(contents) = settings::load_settings_string() {
        log::info!("");
        for line in contents.lines() {
            log::info!("    {}", line);
        }
    }
    log::info!("");

    let effective = globals.settings();
    let database = effective
        .resolve_database(globals.db.clone())
        .map(|p| p.display().to_string());
    let fields = [
        ("database", database, DB_ENV),
        ("identity", Some(effective.identity().to_string()), IDENTITY_ENV),
        (
            "busy_timeout_ms",
            Some(effective.database.busy_timeout_ms.to_string()),
            "",
        ),
    ];
    for (name, value, env) in fields {
        let source = if !env.is_empty() && std::env::var(env).is_ok_and(|v| !v.is_empty()) {
            format!("(env {})", env)
        } else {
            String::new()
        };
        match value {
            Some(v) => log::info!(
                "  {:<16} {} {}",
                name,
                v.if_supports_color(Stdout, |t| t.green()),
                source.if_supports_color(Stdout, |t| t.dimmed()),
            ),
            None => log::info!(
                "  {:<16} {}",
                name,
                "(not set)".if_supports_color(Stdout, |t| t.dimmed()),
            ),
        }
    }
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    println!("{}", settings::settings_path().display());
}

/// Save or clear `database.default_path`.
pub(crate) fn run_config_set_db(path: Option<PathBuf>) -> Result<(), CliError> {
    let absolute = match path {
        Some(p) if p.is_relative() => Some(std::env::current_dir()?.join(p)),
        other => other,
    };
    settings::save_database_path(absolute.as_deref())?;

    match &absolute {
        Some(p) => log::info!(
            "Default database set to {}",
            p.display().if_supports_color(Stdout, |t| t.cyan()),
        ),
        None => log::info!("Default database cleared"),
    }
    Ok(())
}

/// Save `editor.identity`, or reset it to `auto`.
pub(crate) fn run_config_set_key(rule: Option<String>) -> Result<(), CliError> {
    let rule: Option<IdentityColumn> = rule.map(|r| r.parse().unwrap_or_default());
    settings::save_identity(rule.as_ref())?;

    log::info!(
        "Identity rule set to {}",
        rule.unwrap_or_default()
            .if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
