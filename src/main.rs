mod cli;
mod commands;
mod config;
mod editor;
mod logging;
mod model;
mod reorder;
mod script;
mod store;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = config::load(args.config.as_deref())?;
    let level = logging::resolve_level(args.log_level.as_deref(), config.log_level.as_deref());
    let log = match logging::init_logging(level) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("warning: failed to initialize logging: {:#}", err);
            None
        }
    };

    let command = args.command.unwrap_or(cli::Command::Tui);
    let result = match command {
        cli::Command::Tui => commands::tui(config),
        cli::Command::Replay { script, yaml } => commands::replay(&script, yaml, &config),
    };
    if let (Err(_), Some(handle)) = (&result, &log) {
        eprintln!("log file: {}", handle.path.display());
    }
    result
}
