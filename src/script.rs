use crate::editor::{EditPlacement, EditorError, FieldValue, TaskEditor};
use crate::model::{Board, BoardError, Priority, Task};
use crate::reorder::{self, DropOutcome, DropResult};
use crate::store::ColumnStore;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub steps: Vec<Step>,
}

/// One gesture. Existing tasks are addressed by title since ids are only
/// known once a task exists.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    Create {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        priority: Priority,
    },
    Edit {
        target: String,
        title: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
    },
    Delete {
        target: String,
    },
    Drag {
        source: RawLocation,
        #[serde(default)]
        destination: Option<RawLocation>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLocation {
    pub column: String,
    pub index: usize,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ScriptError {
    #[error("no task titled {0:?}")]
    UnknownTarget(String),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Editor(#[from] EditorError),
}

pub fn parse(raw: &str) -> Result<Script> {
    serde_yaml::from_str(raw).context("parsing replay script")
}

/// Drives the store and editor the way the board view does, minus the
/// terminal.
pub struct Replay {
    store: ColumnStore,
    editor: TaskEditor,
}

impl Replay {
    pub fn new(edit_placement: EditPlacement) -> Self {
        Replay {
            store: ColumnStore::new(),
            editor: TaskEditor::new(edit_placement),
        }
    }

    pub fn board(&self) -> &Board {
        self.store.snapshot()
    }

    /// Applies one step and returns a short summary of what happened.
    pub fn apply(&mut self, step: &Step) -> Result<String, ScriptError> {
        match step {
            Step::Create {
                title,
                description,
                priority,
            } => {
                self.editor.open_create();
                if let Some(form) = self.editor.form_mut() {
                    form.title = FieldValue::new(title);
                    form.description = FieldValue::new(description);
                    form.priority = *priority;
                }
                let id = self.submit()?;
                Ok(format!("created {}", id))
            }
            Step::Edit {
                target,
                title,
                description,
                priority,
            } => {
                let task = self.find(target)?.clone();
                self.editor.open_edit(&task);
                if let Some(form) = self.editor.form_mut() {
                    if let Some(title) = title {
                        form.title = FieldValue::new(title);
                    }
                    if let Some(description) = description {
                        form.description = FieldValue::new(description);
                    }
                    if let Some(priority) = priority {
                        form.priority = *priority;
                    }
                }
                let id = self.submit()?;
                Ok(format!("edited {}", id))
            }
            Step::Delete { target } => {
                let id = self.find(target)?.id.clone();
                self.store.remove(&id);
                Ok(format!("deleted {}", id))
            }
            Step::Drag {
                source,
                destination,
            } => {
                let drop = DropResult::from_raw(
                    &source.column,
                    source.index,
                    destination.as_ref().map(|d| (d.column.as_str(), d.index)),
                )?;
                let outcome = reorder::on_drag_end(&mut self.store, &drop)?;
                Ok(describe_drop(&outcome))
            }
        }
    }

    fn submit(&mut self) -> Result<String, ScriptError> {
        match self.editor.submit(self.store.snapshot()) {
            Ok(submission) => {
                let id = submission.task.id.to_string();
                self.store.insert(submission.task, submission.placement);
                Ok(id)
            }
            Err(err) => {
                self.editor.cancel();
                Err(err.into())
            }
        }
    }

    fn find(&self, title: &str) -> Result<&Task, ScriptError> {
        self.board()
            .columns()
            .iter()
            .flat_map(|column| column.tasks.iter())
            .find(|task| task.title == title)
            .ok_or_else(|| ScriptError::UnknownTarget(title.to_string()))
    }
}

fn describe_drop(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Cancelled => "drag cancelled".into(),
        DropOutcome::Unchanged => "drag left board unchanged".into(),
        DropOutcome::Reordered { column, from, to } => {
            format!("reordered {} {} -> {}", column, from, to)
        }
        DropOutcome::Moved { from, to } => format!(
            "moved {}[{}] -> {}[{}]",
            from.column, from.index, to.column, to.index
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::titles;
    use crate::model::Status;

    fn run(raw: &str) -> (Replay, Vec<Result<String, ScriptError>>) {
        let script = parse(raw).unwrap();
        let mut replay = Replay::new(EditPlacement::Keep);
        let results: Vec<_> = script.steps.iter().map(|s| replay.apply(s)).collect();
        (replay, results)
    }

    #[test]
    fn newest_task_lands_on_top() {
        let (replay, results) = run(
            "steps:\n  - op: create\n    title: A\n  - op: create\n    title: B\n",
        );
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(titles(replay.board(), Status::Todo), vec!["B", "A"]);
    }

    #[test]
    fn blank_title_step_is_refused() {
        let (replay, results) = run("steps:\n  - op: create\n    title: '   '\n");
        assert_eq!(results[0], Err(ScriptError::Editor(EditorError::EmptyTitle)));
        assert_eq!(replay.board(), &Board::empty());
    }

    #[test]
    fn drag_delete_and_edit_flow() {
        let raw = r#"
steps:
  - op: create
    title: A
    priority: high
  - op: create
    title: B
  - op: drag
    source: { column: todo, index: 1 }
    destination: { column: inprogress, index: 0 }
  - op: edit
    target: A
    title: A2
  - op: drag
    source: { column: todo, index: 0 }
  - op: delete
    target: B
"#;
        let (replay, results) = run(raw);
        assert!(results.iter().all(Result::is_ok), "{:?}", results);
        let board = replay.board();
        assert!(board.column(Status::Todo).is_empty());
        assert_eq!(titles(board, Status::InProgress), vec!["A2"]);
        let edited = board.task_at(Status::InProgress, 0).unwrap();
        assert_eq!(edited.status, Status::InProgress);
        assert_eq!(edited.priority, Priority::High);
    }

    #[test]
    fn bad_drags_are_reported() {
        let raw = r#"
steps:
  - op: create
    title: A
  - op: drag
    source: { column: todo, index: 4 }
    destination: { column: done, index: 0 }
  - op: drag
    source: { column: backlog, index: 0 }
    destination: { column: done, index: 0 }
  - op: delete
    target: Z
"#;
        let (replay, results) = run(raw);
        assert!(matches!(
            results[1],
            Err(ScriptError::Board(BoardError::IndexOutOfBounds { .. }))
        ));
        assert_eq!(
            results[2],
            Err(ScriptError::Board(BoardError::UnknownColumn("backlog".into())))
        );
        assert_eq!(results[3], Err(ScriptError::UnknownTarget("Z".into())));
        assert_eq!(titles(replay.board(), Status::Todo), vec!["A"]);
    }

    #[test]
    fn unknown_ops_fail_to_parse() {
        assert!(parse("steps:\n  - op: archive\n    target: A\n").is_err());
    }
}
