use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about = "Terminal kanban task board")]
pub struct Cli {
    /// Config file to use instead of the per-user one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the interactive TUI
    Tui,
    /// Apply a YAML script of board gestures and print the result
    Replay {
        /// Path to the script
        script: PathBuf,
        /// Print the final board as YAML
        #[arg(long)]
        yaml: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["taskboard"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn replay_takes_script_and_flags() {
        let cli = Cli::try_parse_from([
            "taskboard",
            "replay",
            "steps.yml",
            "--yaml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Command::Replay { script, yaml }) => {
                assert_eq!(script, PathBuf::from("steps.yml"));
                assert!(yaml);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
