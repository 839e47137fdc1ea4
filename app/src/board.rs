//! Board state: three fixed columns and a selection cursor.
//!
//! Partitioning is pure - the board is always rebuilt from a fresh fetch,
//! never patched in place. A status transition goes through the backend
//! and comes back via re-fetch, so this module never mutates a task.

use tally_types::{Task, TaskStatus};

/// Tasks partitioned into the three fixed columns, backend order preserved
/// within each column.
#[derive(Debug, Default)]
pub struct Board {
    columns: [Vec<Task>; 3],
}

impl Board {
    #[must_use]
    pub fn partition(tasks: Vec<Task>) -> Self {
        let mut columns: [Vec<Task>; 3] = Default::default();
        for task in tasks {
            columns[column_index(task.status)].push(task);
        }
        Self { columns }
    }

    #[must_use]
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        &self.columns[column_index(status)]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    #[must_use]
    pub fn task_at(&self, selection: Selection) -> Option<&Task> {
        self.columns
            .get(selection.column)?
            .get(selection.row)
    }
}

const fn column_index(status: TaskStatus) -> usize {
    match status {
        TaskStatus::ToDo => 0,
        TaskStatus::InProgress => 1,
        TaskStatus::Done => 2,
    }
}

/// Column header status for a column index.
#[must_use]
pub const fn column_status(index: usize) -> TaskStatus {
    match index {
        0 => TaskStatus::ToDo,
        1 => TaskStatus::InProgress,
        _ => TaskStatus::Done,
    }
}

/// Cursor over the board. Kept valid by clamping against the current
/// board after every rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub column: usize,
    pub row: usize,
}

impl Selection {
    pub fn move_left(&mut self) {
        self.column = self.column.saturating_sub(1);
        self.row = 0;
    }

    pub fn move_right(&mut self) {
        self.column = (self.column + 1).min(2);
        self.row = 0;
    }

    pub fn move_up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn move_down(&mut self, board: &Board) {
        let len = board.column(column_status(self.column)).len();
        self.row = (self.row + 1).min(len.saturating_sub(1));
    }

    /// Re-fit the cursor after the board was rebuilt from a fetch.
    pub fn clamp(&mut self, board: &Board) {
        self.column = self.column.min(2);
        let len = board.column(column_status(self.column)).len();
        self.row = self.row.min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::{Board, Selection, column_status};
    use tally_types::{RecordId, Task, TaskStatus, UserId};

    fn task(name: &str, status: TaskStatus) -> Task {
        Task {
            id: RecordId::new(format!("rec-{name}")),
            owner: UserId::new("u1"),
            name: name.to_string(),
            description: String::new(),
            status,
            due_date: None,
            created_at: None,
        }
    }

    #[test]
    fn partition_buckets_by_status() {
        let board = Board::partition(vec![
            task("a", TaskStatus::ToDo),
            task("b", TaskStatus::Done),
            task("c", TaskStatus::ToDo),
            task("d", TaskStatus::InProgress),
        ]);

        let names: Vec<&str> = board
            .column(TaskStatus::ToDo)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(board.column(TaskStatus::InProgress).len(), 1);
        assert_eq!(board.column(TaskStatus::Done).len(), 1);
    }

    #[test]
    fn partition_preserves_backend_order_within_column() {
        let board = Board::partition(vec![
            task("first", TaskStatus::Done),
            task("second", TaskStatus::Done),
            task("third", TaskStatus::Done),
        ]);
        let names: Vec<&str> = board
            .column(TaskStatus::Done)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn empty_board() {
        let board = Board::partition(Vec::new());
        assert!(board.is_empty());
        assert!(board.task_at(Selection::default()).is_none());
    }

    #[test]
    fn selection_clamps_after_rebuild() {
        let board = Board::partition(vec![task("only", TaskStatus::ToDo)]);
        let mut selection = Selection { column: 0, row: 5 };
        selection.clamp(&board);
        assert_eq!(selection.row, 0);
        assert_eq!(board.task_at(selection).unwrap().name, "only");
    }

    #[test]
    fn selection_stays_on_board() {
        let board = Board::partition(Vec::new());
        let mut selection = Selection::default();
        selection.move_left();
        assert_eq!(selection.column, 0);
        selection.move_right();
        selection.move_right();
        selection.move_right();
        assert_eq!(selection.column, 2);
        selection.move_down(&board);
        assert_eq!(selection.row, 0);
    }

    #[test]
    fn column_status_covers_all_columns() {
        assert_eq!(column_status(0), TaskStatus::ToDo);
        assert_eq!(column_status(1), TaskStatus::InProgress);
        assert_eq!(column_status(2), TaskStatus::Done);
    }
}
