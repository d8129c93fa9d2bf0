//! tabledit CLI
//!
//! Command-line front end for inspecting SQLite tables and committing
//! buffered row edits.

mod cli_types;
mod commands;
mod error;

use std::io::Write;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{Cli, Commands, ConfigAction};
use commands::Target;
use error::CliError;

fn main() {
    let cli = Cli::parse();
    let target = if cli.logs_to_stderr() {
        env_logger::Target::Stderr
    } else {
        env_logger::Target::Stdout
    };
    init_logging(cli.quiet, cli.verbose, target);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".if_supports_color(Stderr, |t| t.red()), e);
        std::process::exit(1);
    }
}

/// Log records are the normal output channel, printed bare to `target`.
/// `RUST_LOG` overrides the level picked by the flags.
fn init_logging(quiet: bool, verbose: bool, target: env_logger::Target) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(target)
        .format(|buf, record| match record.level() {
            log::Level::Warn | log::Level::Error => {
                writeln!(buf, "{}: {}", record.level(), record.args())
            }
            _ => writeln!(buf, "{}", record.args()),
        })
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let globals = commands::Globals {
        db: cli.db,
        key: cli.key,
    };

    match cli.command {
        Commands::Tables { path } => commands::tables::run_tables(&globals, path),
        Commands::Describe { target } => {
            commands::describe::run_describe(&globals, Target::parse(target)?)
        }
        Commands::Show { target, limit } => {
            commands::show::run_show(&globals, Target::parse(target)?, limit)
        }
        Commands::Edit {
            target,
            sets,
            inserts,
            deletes,
            dry_run,
            json,
        } => commands::edit::run_edit(
            &globals,
            Target::parse(target)?,
            commands::edit::EditArgs {
                sets,
                inserts,
                deletes,
                dry_run,
                json,
            },
        ),
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config::run_config_show(&globals);
                Ok(())
            }
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::SetDb { path } => commands::config::run_config_set_db(path),
            ConfigAction::SetKey { rule } => commands::config::run_config_set_key(rule),
        },
    }
}
