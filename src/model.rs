use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        TaskId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column a task lives in. The serialized form doubles as the column id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn id(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "inprogress",
            Status::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }

    pub fn next(&self) -> Option<Status> {
        Status::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<Status> {
        self.index().checked_sub(1).map(|idx| Status::ALL[idx])
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Status {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .copied()
            .find(|status| status.id() == s.trim())
            .ok_or_else(|| BoardError::UnknownColumn(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn next(&self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn prev(&self) -> Priority {
        match self {
            Priority::Low => Priority::High,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: TaskId, title: String, description: String, priority: Priority) -> Self {
        let now = Utc::now();
        Task {
            id,
            title,
            description,
            priority,
            status: Status::Todo,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub status: Status,
    pub tasks: Vec<Task>,
}

impl Column {
    fn empty(status: Status) -> Self {
        Column {
            status,
            tasks: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.status.label()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Front,
    /// Clamped to the column length, so anything past the end appends.
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub column: Status,
    pub position: Position,
}

impl Placement {
    pub fn front_of(column: Status) -> Self {
        Placement {
            column,
            position: Position::Front,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Placement::front_of(Status::Todo)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("index {index} out of bounds for column {column} (len {len})")]
    IndexOutOfBounds {
        column: Status,
        index: usize,
        len: usize,
    },
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// Snapshot of the three columns. Every update returns a new value and leaves
/// `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    columns: [Column; 3],
}

impl Board {
    pub fn empty() -> Self {
        Board {
            columns: Status::ALL.map(Column::empty),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, status: Status) -> &Column {
        &self.columns[status.index()]
    }

    fn column_mut(&mut self, status: Status) -> &mut Column {
        &mut self.columns[status.index()]
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    pub fn locate(&self, id: &TaskId) -> Option<(Status, usize)> {
        self.columns.iter().find_map(|column| {
            column
                .tasks
                .iter()
                .position(|task| &task.id == id)
                .map(|idx| (column.status, idx))
        })
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        let (status, idx) = self.locate(id)?;
        self.column(status).tasks.get(idx)
    }

    pub fn task_at(&self, status: Status, index: usize) -> Option<&Task> {
        self.column(status).tasks.get(index)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.locate(id).is_some()
    }

    /// Places `task` after dropping any task that shares its id. The task's
    /// status is rewritten to the target column.
    pub fn with_inserted(&self, mut task: Task, placement: Placement) -> Board {
        let mut next = self.with_removed(&task.id);
        task.status = placement.column;
        let tasks = &mut next.column_mut(placement.column).tasks;
        let at = match placement.position {
            Position::Front => 0,
            Position::Index(idx) => idx.min(tasks.len()),
        };
        tasks.insert(at, task);
        next
    }

    pub fn with_removed(&self, id: &TaskId) -> Board {
        let mut next = self.clone();
        for column in next.columns.iter_mut() {
            column.tasks.retain(|task| &task.id != id);
        }
        next
    }

    /// Takes the task at `from_index` out of `from` and inserts it at
    /// `to_index` in `to`. `to_index` may equal the destination length, which
    /// appends.
    pub fn with_moved(
        &self,
        from: Status,
        from_index: usize,
        to: Status,
        to_index: usize,
    ) -> Result<Board, BoardError> {
        let source_len = self.column(from).len();
        if from_index >= source_len {
            return Err(BoardError::IndexOutOfBounds {
                column: from,
                index: from_index,
                len: source_len,
            });
        }
        let dest_len = self.column(to).len();
        if to_index > dest_len {
            return Err(BoardError::IndexOutOfBounds {
                column: to,
                index: to_index,
                len: dest_len,
            });
        }

        let mut next = self.clone();
        let mut task = next.column_mut(from).tasks.remove(from_index);
        if task.status != to {
            task.status = to;
            task.updated_at = Utc::now();
        }
        let tasks = &mut next.column_mut(to).tasks;
        // Within one column the sequence is one shorter once the task is out.
        let slot = to_index.min(tasks.len());
        tasks.insert(slot, task);
        Ok(next)
    }

    /// True when every task sits in the column named by its status and no id
    /// appears twice.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        self.columns.iter().all(|column| {
            column
                .tasks
                .iter()
                .all(|task| task.status == column.status && seen.insert(task.id.clone()))
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn task(id: &str) -> Task {
        Task::new(TaskId::new(id), id.to_string(), String::new(), Priority::Low)
    }

    pub(crate) fn titles(board: &Board, status: Status) -> Vec<String> {
        board
            .column(status)
            .tasks
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    fn board_with(todo: &[&str], doing: &[&str]) -> Board {
        let mut board = Board::empty();
        for id in todo.iter().rev() {
            board = board.with_inserted(task(id), Placement::default());
        }
        for id in doing {
            board = board.with_inserted(
                task(id),
                Placement {
                    column: Status::InProgress,
                    position: Position::Index(usize::MAX),
                },
            );
        }
        board
    }

    #[test]
    fn status_ids_round_trip_through_from_str() {
        for status in Status::ALL {
            assert_eq!(status.id().parse::<Status>(), Ok(status));
        }
        assert_eq!(
            "backlog".parse::<Status>(),
            Err(BoardError::UnknownColumn("backlog".into()))
        );
    }

    #[test]
    fn status_serializes_as_column_id() {
        let yaml = serde_yaml::to_string(&Status::InProgress).unwrap();
        assert_eq!(yaml.trim(), "inprogress");
    }

    #[test]
    fn status_neighbours_stop_at_the_edges() {
        assert_eq!(Status::Todo.prev(), None);
        assert_eq!(Status::Todo.next(), Some(Status::InProgress));
        assert_eq!(Status::Done.next(), None);
        assert_eq!(Status::Done.prev(), Some(Status::InProgress));
    }

    #[test]
    fn insert_goes_to_front_of_todo_by_default() {
        let board = Board::empty()
            .with_inserted(task("A"), Placement::default())
            .with_inserted(task("B"), Placement::default());
        assert_eq!(titles(&board, Status::Todo), vec!["B", "A"]);
        assert!(board.column(Status::InProgress).is_empty());
        assert!(board.column(Status::Done).is_empty());
    }

    #[test]
    fn insert_replaces_existing_id_anywhere_on_the_board() {
        let board = board_with(&[], &["A", "B"]);
        let mut edited = task("A");
        edited.title = "A2".into();
        let next = board.with_inserted(edited, Placement::default());
        assert_eq!(next.task_count(), 2);
        assert_eq!(titles(&next, Status::Todo), vec!["A2"]);
        assert_eq!(titles(&next, Status::InProgress), vec!["B"]);
        assert!(next.is_consistent());
    }

    #[test]
    fn insert_rewrites_status_to_target_column() {
        let board = Board::empty().with_inserted(task("A"), Placement::front_of(Status::Done));
        assert_eq!(board.task(&TaskId::new("A")).unwrap().status, Status::Done);
    }

    #[test]
    fn insert_index_past_end_appends() {
        let board = board_with(&["A", "B"], &[]);
        let next = board.with_inserted(
            task("C"),
            Placement {
                column: Status::Todo,
                position: Position::Index(99),
            },
        );
        assert_eq!(titles(&next, Status::Todo), vec!["A", "B", "C"]);
    }

    #[test]
    fn remove_missing_task_is_a_no_op() {
        let board = board_with(&["A"], &[]);
        assert_eq!(board.with_removed(&TaskId::new("zzz")), board);
    }

    #[test]
    fn remove_leaves_other_columns_alone() {
        let board = board_with(&["B"], &["A"]);
        let next = board.with_removed(&TaskId::new("A"));
        assert!(next.column(Status::InProgress).is_empty());
        assert_eq!(titles(&next, Status::Todo), vec!["B"]);
    }

    #[test]
    fn move_across_columns_updates_status() {
        let board = board_with(&["A"], &[]);
        let next = board
            .with_moved(Status::Todo, 0, Status::InProgress, 0)
            .unwrap();
        assert!(next.column(Status::Todo).is_empty());
        assert_eq!(titles(&next, Status::InProgress), vec!["A"]);
        assert_eq!(next.task_at(Status::InProgress, 0).unwrap().status, Status::InProgress);
        assert!(next.is_consistent());
    }

    #[test]
    fn move_within_column_reorders() {
        let board = board_with(&["A", "B"], &[]);
        let next = board.with_moved(Status::Todo, 0, Status::Todo, 1).unwrap();
        assert_eq!(titles(&next, Status::Todo), vec!["B", "A"]);
    }

    #[test]
    fn move_to_column_length_appends_within_column() {
        let board = board_with(&["A", "B"], &[]);
        let next = board.with_moved(Status::Todo, 0, Status::Todo, 2).unwrap();
        assert_eq!(titles(&next, Status::Todo), vec!["B", "A"]);
        let same = board.with_moved(Status::Todo, 1, Status::Todo, 2).unwrap();
        assert_eq!(same, board);
    }

    #[test]
    fn move_to_same_slot_yields_identical_board() {
        let board = board_with(&["A", "B", "C"], &[]);
        let next = board.with_moved(Status::Todo, 1, Status::Todo, 1).unwrap();
        assert_eq!(next, board);
    }

    #[test]
    fn move_to_length_appends() {
        let board = board_with(&["A"], &["X", "Y"]);
        let next = board
            .with_moved(Status::Todo, 0, Status::InProgress, 2)
            .unwrap();
        assert_eq!(titles(&next, Status::InProgress), vec!["X", "Y", "A"]);
    }

    #[test]
    fn move_rejects_out_of_bounds_indices() {
        let board = board_with(&["A", "B"], &["X"]);
        assert_eq!(
            board.with_moved(Status::Todo, 2, Status::Done, 0),
            Err(BoardError::IndexOutOfBounds {
                column: Status::Todo,
                index: 2,
                len: 2
            })
        );
        assert_eq!(
            board.with_moved(Status::Todo, 0, Status::InProgress, 2),
            Err(BoardError::IndexOutOfBounds {
                column: Status::InProgress,
                index: 2,
                len: 1
            })
        );
        assert!(board.with_moved(Status::Todo, 0, Status::Todo, 3).is_err());
        assert!(board.with_moved(Status::Done, 0, Status::Todo, 0).is_err());
    }

    #[test]
    fn moves_preserve_task_count_and_consistency() {
        let board = board_with(&["A", "B", "C"], &["D", "E"]);
        let mut tried = 0;
        for from in Status::ALL {
            for from_idx in 0..board.column(from).len() {
                for to in Status::ALL {
                    for to_idx in 0..=board.column(to).len() {
                        let next = board.with_moved(from, from_idx, to, to_idx).unwrap();
                        assert_eq!(next.task_count(), board.task_count());
                        assert!(next.is_consistent(), "{from}[{from_idx}] -> {to}[{to_idx}]");
                        let moved = board.task_at(from, from_idx).unwrap();
                        assert_eq!(next.task(&moved.id).map(|t| t.status), Some(to));
                        tried += 1;
                    }
                }
            }
        }
        assert_eq!(tried, 3 * (4 + 3 + 1) + 2 * (4 + 3 + 1));
    }

    #[test]
    fn priority_cycles_both_ways() {
        assert_eq!(Priority::default(), Priority::Low);
        assert_eq!(Priority::High.next(), Priority::Low);
        assert_eq!(Priority::Low.prev(), Priority::High);
        assert_eq!(Priority::Medium.next().prev(), Priority::Medium);
    }
}
