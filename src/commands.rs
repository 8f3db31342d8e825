use crate::config::Config;
use crate::model::{Board, Task};
use crate::script::{self, Replay};
use crate::ui;
use anyhow::{Context, Result};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub fn tui(config: Config) -> Result<()> {
    info!("starting tui");
    ui::run(config)
}

pub fn replay(path: &Path, yaml: bool, config: &Config) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let script = script::parse(&raw)?;
    let mut replay = Replay::new(config.edit_placement);
    for (idx, step) in script.steps.iter().enumerate() {
        let number = idx + 1;
        match replay.apply(step) {
            Ok(summary) => info!(step = number, "{}", summary),
            Err(err) => {
                warn!(step = number, error = %err, "step rejected");
                eprintln!("step {}: {}", number, err);
            }
        }
    }
    if yaml {
        let serialized = serde_yaml::to_string(replay.board()).context("serializing board")?;
        print!("{}", serialized);
    } else {
        let listing = render_listing(replay.board()).context("rendering board")?;
        print!("{}", listing);
    }
    Ok(())
}

fn render_listing(board: &Board) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for column in board.columns() {
        writeln!(out, "{} ({})", column.status, column.name())?;
        if column.is_empty() {
            writeln!(out, "  (empty)")?;
        }
        for task in &column.tasks {
            write_task(&mut out, task)?;
        }
        out.push('\n');
    }
    Ok(out)
}

fn write_task(out: &mut String, task: &Task) -> fmt::Result {
    writeln!(
        out,
        "  - [{}] {} ({})",
        task.id,
        task.title,
        task.priority.label()
    )?;
    for line in task.description.lines().filter(|l| !l.trim().is_empty()) {
        writeln!(out, "    {}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Placement, Priority, Status, TaskId};
    use std::io::Write;

    #[test]
    fn listing_shows_every_column() {
        let mut task = Task::new(
            TaskId::new("abc123"),
            "Ship it".into(),
            "first line\n\nsecond line".into(),
            Priority::High,
        );
        task.status = Status::Done;
        let board = Board::empty().with_inserted(task, Placement::front_of(Status::Done));
        let listing = render_listing(&board).unwrap();
        assert!(listing.starts_with("todo (To Do)\n  (empty)\n"));
        assert!(listing.contains("inprogress (In Progress)\n  (empty)\n"));
        assert!(listing.contains(
            "done (Done)\n  - [abc123] Ship it (high)\n    first line\n    second line\n"
        ));
    }

    #[test]
    fn replay_reads_script_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "steps:\n  - op: create\n    title: A").unwrap();
        assert!(replay(file.path(), false, &Config::default()).is_ok());
        assert!(replay(file.path(), true, &Config::default()).is_ok());
    }

    #[test]
    fn replay_fails_on_malformed_script() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "steps: 12").unwrap();
        assert!(replay(file.path(), false, &Config::default()).is_err());
    }
}
