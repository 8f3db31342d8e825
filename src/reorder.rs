use crate::model::{Board, BoardError, Status};
use crate::store::ColumnStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragLocation {
    pub column: Status,
    pub index: usize,
}

impl DragLocation {
    pub fn new(column: Status, index: usize) -> Self {
        DragLocation { column, index }
    }
}

/// What the drag gesture reports when the pointer is released. A missing
/// destination means the drop was cancelled or landed outside every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropResult {
    pub source: DragLocation,
    #[serde(default)]
    pub destination: Option<DragLocation>,
}

impl DropResult {
    pub fn cancelled(source: DragLocation) -> Self {
        DropResult {
            source,
            destination: None,
        }
    }

    pub fn to(source: DragLocation, destination: DragLocation) -> Self {
        DropResult {
            source,
            destination: Some(destination),
        }
    }

    /// Builds a drop from raw column ids as a gesture library would hand them
    /// over.
    pub fn from_raw(
        source_column: &str,
        source_index: usize,
        destination: Option<(&str, usize)>,
    ) -> Result<Self, BoardError> {
        let source = DragLocation::new(source_column.parse()?, source_index);
        let destination = match destination {
            Some((column, index)) => Some(DragLocation::new(column.parse()?, index)),
            None => None,
        };
        Ok(DropResult {
            source,
            destination,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Cancelled,
    Unchanged,
    Reordered {
        column: Status,
        from: usize,
        to: usize,
    },
    Moved {
        from: DragLocation,
        to: DragLocation,
    },
}

/// Largest index accepted as a drop target in `column`. Dropping exactly
/// there appends.
pub fn drop_limit(board: &Board, column: Status) -> usize {
    board.column(column).len()
}

/// Index the task picked up at `source` ends up at when appended to `column`.
pub fn append_slot(board: &Board, source: DragLocation, column: Status) -> usize {
    let limit = drop_limit(board, column);
    if column == source.column {
        limit.saturating_sub(1)
    } else {
        limit
    }
}

pub fn on_drag_end(
    store: &mut ColumnStore,
    result: &DropResult,
) -> Result<DropOutcome, BoardError> {
    let source = result.source;
    let Some(destination) = result.destination else {
        debug!(column = %source.column, index = source.index, "drop cancelled");
        return Ok(DropOutcome::Cancelled);
    };

    let changed = store
        .move_task(
            source.column,
            source.index,
            destination.column,
            destination.index,
        )
        .map_err(|err| {
            warn!(error = %err, ?result, "drop rejected");
            err
        })?;

    if !changed {
        return Ok(DropOutcome::Unchanged);
    }
    if source.column == destination.column {
        Ok(DropOutcome::Reordered {
            column: source.column,
            from: source.index,
            to: destination
                .index
                .min(store.snapshot().column(source.column).len() - 1),
        })
    } else {
        Ok(DropOutcome::Moved {
            from: source,
            to: destination,
        })
    }
}
