use crate::model::{Board, BoardError, Placement, Status, Task, TaskId};
use tracing::debug;

/// Sole owner of the live board. Readers get a shared snapshot; every write
/// goes through `insert`, `remove` or `move_task`.
#[derive(Debug, Default)]
pub struct ColumnStore {
    board: Board,
    revision: u64,
}

impl ColumnStore {
    pub fn new() -> Self {
        ColumnStore::default()
    }

    pub fn snapshot(&self) -> &Board {
        &self.board
    }

    /// Bumped once per effective change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn insert(&mut self, task: Task, placement: Placement) -> bool {
        let id = task.id.clone();
        let next = self.board.with_inserted(task, placement);
        self.commit(next, "insert", &id)
    }

    pub fn remove(&mut self, id: &TaskId) -> bool {
        let next = self.board.with_removed(id);
        self.commit(next, "remove", id)
    }

    /// Returns `Ok(false)` when the move leaves the board as it was.
    pub fn move_task(
        &mut self,
        from: Status,
        from_index: usize,
        to: Status,
        to_index: usize,
    ) -> Result<bool, BoardError> {
        let next = self.board.with_moved(from, from_index, to, to_index)?;
        let id = next
            .task_at(to, to_index)
            .map(|task| task.id.clone())
            .unwrap_or_else(|| TaskId::new(""));
        Ok(self.commit(next, "move", &id))
    }

    fn commit(&mut self, next: Board, op: &'static str, id: &TaskId) -> bool {
        if next == self.board {
            debug!(op, task_id = %id, "board unchanged");
            return false;
        }
        debug_assert!(next.is_consistent(), "{op} broke board consistency");
        self.board = next;
        self.revision += 1;
        debug!(
            op,
            task_id = %id,
            revision = self.revision,
            tasks = self.board.task_count(),
            "board updated"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{task, titles};

    #[test]
    fn create_then_move_then_delete() {
        let mut store = ColumnStore::new();
        assert!(store.insert(task("A"), Placement::default()));
        assert_eq!(titles(store.snapshot(), Status::Todo), vec!["A"]);
        assert!(store.snapshot().column(Status::InProgress).is_empty());
        assert!(store.snapshot().column(Status::Done).is_empty());

        assert_eq!(
            store.move_task(Status::Todo, 0, Status::InProgress, 0),
            Ok(true)
        );
        assert!(store.snapshot().column(Status::Todo).is_empty());
        let moved = store.snapshot().task_at(Status::InProgress, 0).unwrap();
        assert_eq!(moved.title, "A");
        assert_eq!(moved.status, Status::InProgress);

        assert!(store.insert(task("B"), Placement::default()));
        assert!(store.remove(&TaskId::new("A")));
        assert!(store.snapshot().column(Status::InProgress).is_empty());
        assert_eq!(titles(store.snapshot(), Status::Todo), vec!["B"]);
    }

    #[test]
    fn revision_only_moves_on_change() {
        let mut store = ColumnStore::new();
        store.insert(task("A"), Placement::default());
        store.insert(task("B"), Placement::default());
        assert_eq!(store.revision(), 2);

        assert!(!store.remove(&TaskId::new("missing")));
        assert_eq!(store.move_task(Status::Todo, 0, Status::Todo, 0), Ok(false));
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn rejected_move_keeps_snapshot() {
        let mut store = ColumnStore::new();
        store.insert(task("A"), Placement::default());
        let before = store.snapshot().clone();
        assert!(store.move_task(Status::Todo, 3, Status::Done, 0).is_err());
        assert_eq!(store.snapshot(), &before);
        assert_eq!(store.revision(), 1);
    }
}
