use crate::model::{Board, Placement, Position, Priority, Status, Task, TaskId};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where an edited task lands once saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditPlacement {
    /// Same column, same slot.
    #[default]
    Keep,
    /// Front of To Do with the status reset.
    Todo,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("title is required")]
    EmptyTitle,
    #[error("editor is not open")]
    NotOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(Task),
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    pub mode: EditorMode,
    pub form: TaskForm,
}

#[derive(Debug, Clone)]
pub enum EditorState {
    Closed,
    Open(EditorSession),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub task: Task,
    pub placement: Placement,
}

#[derive(Debug)]
pub struct TaskEditor {
    state: EditorState,
    edit_placement: EditPlacement,
}

impl TaskEditor {
    pub fn new(edit_placement: EditPlacement) -> Self {
        TaskEditor {
            state: EditorState::Closed,
            edit_placement,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, EditorState::Open(_))
    }

    pub fn session(&self) -> Option<&EditorSession> {
        match &self.state {
            EditorState::Open(session) => Some(session),
            EditorState::Closed => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        match &mut self.state {
            EditorState::Open(session) => Some(&mut session.form),
            EditorState::Closed => None,
        }
    }

    pub fn open_create(&mut self) {
        self.state = EditorState::Open(EditorSession {
            mode: EditorMode::Create,
            form: TaskForm::new(),
        });
    }

    pub fn open_edit(&mut self, task: &Task) {
        self.state = EditorState::Open(EditorSession {
            mode: EditorMode::Edit(task.clone()),
            form: TaskForm::from_task(task),
        });
    }

    pub fn cancel(&mut self) {
        self.state = EditorState::Closed;
    }

    /// Builds the task described by the form and closes the editor. On error
    /// the editor stays open with the form intact.
    pub fn submit(&mut self, board: &Board) -> Result<Submission, EditorError> {
        let session = self.session().ok_or(EditorError::NotOpen)?;
        let form = &session.form;
        let title = form.title.value.trim();
        if title.is_empty() {
            return Err(EditorError::EmptyTitle);
        }

        let submission = match &session.mode {
            EditorMode::Create => {
                let task = Task::new(
                    generate_id(board),
                    title.to_string(),
                    form.description.value.clone(),
                    form.priority,
                );
                Submission {
                    task,
                    placement: Placement::default(),
                }
            }
            EditorMode::Edit(original) => {
                let mut task = original.clone();
                task.title = title.to_string();
                task.description = form.description.value.clone();
                task.priority = form.priority;
                task.updated_at = Utc::now();
                Submission {
                    placement: self.edit_target(board, original),
                    task,
                }
            }
        };
        debug!(task_id = %submission.task.id, "editor submitted");
        self.state = EditorState::Closed;
        Ok(submission)
    }

    fn edit_target(&self, board: &Board, original: &Task) -> Placement {
        match self.edit_placement {
            EditPlacement::Todo => Placement::default(),
            EditPlacement::Keep => match board.locate(&original.id) {
                Some((column, idx)) => Placement {
                    column,
                    position: Position::Index(idx),
                },
                None => Placement::front_of(original.status),
            },
        }
    }
}

/// Random short id not already used on `board`.
pub fn generate_id(board: &Board) -> TaskId {
    loop {
        let raw: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        let id = TaskId::new(raw);
        if !board.contains(&id) {
            return id;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: FieldValue,
    pub description: FieldValue,
    pub priority: Priority,
    pub field: FormField,
}

impl TaskForm {
    pub fn new() -> Self {
        TaskForm {
            title: FieldValue::new(""),
            description: FieldValue::new(""),
            priority: Priority::default(),
            field: FormField::Title,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        TaskForm {
            title: FieldValue::new(&task.title),
            description: FieldValue::new(&task.description),
            priority: task.priority,
            field: FormField::Title,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Priority,
            FormField::Priority => FormField::Title,
        };
    }

    pub fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Priority,
            FormField::Description => FormField::Title,
            FormField::Priority => FormField::Description,
        };
    }

    /// Text under the cursor, or `None` while the priority picker has focus.
    pub fn active_text_mut(&mut self) -> Option<&mut FieldValue> {
        match self.field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Priority => None,
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        TaskForm::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub value: String,
    pub cursor: usize,
}

impl FieldValue {
    pub fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char_boundary(self.cursor, &self.value);
    }

    pub fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char_boundary(self.cursor, &self.value);
    }

    pub fn move_up(&mut self) {
        let (line_starts, line_idx, col) = line_state(&self.value, self.cursor);
        if line_idx == 0 {
            return;
        }
        let target_start = line_starts[line_idx - 1];
        self.cursor = index_at_col(&self.value, target_start, col);
    }

    pub fn move_down(&mut self) {
        let (line_starts, line_idx, col) = line_state(&self.value, self.cursor);
        if line_idx + 1 >= line_starts.len() {
            return;
        }
        let target_start = line_starts[line_idx + 1];
        self.cursor = index_at_col(&self.value, target_start, col);
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

fn prev_char_boundary(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_char_boundary(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}

fn line_state(text: &str, cursor: usize) -> (Vec<usize>, usize, usize) {
    let mut starts = vec![0];
    for (idx, ch) in text.char_indices() {
        if ch == '\n' {
            starts.push(idx + 1);
        }
    }
    let line_idx = starts
        .iter()
        .rposition(|start| *start <= cursor)
        .unwrap_or(0);
    let col = text[starts[line_idx]..cursor].chars().count();
    (starts, line_idx, col)
}

fn index_at_col(text: &str, start: usize, target_col: usize) -> usize {
    let slice = &text[start..];
    let limit = slice.find('\n').unwrap_or(slice.len());
    slice[..limit]
        .char_indices()
        .nth(target_col)
        .map(|(idx, _)| start + idx)
        .unwrap_or(start + limit)
}
