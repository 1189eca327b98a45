use crate::grid::Cell;
use thiserror::Error;

/// The knowledge base has been handed facts that cannot all be true.
///
/// None of these are recoverable: they mean an observation fed to the agent
/// was wrong, or two facts about the same cell contradict each other.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    #[error("cell {cell} is outside the board")]
    OutOfBounds { cell: Cell },

    #[error("cell {cell} is marked as both safe and a mine")]
    ConflictingMark { cell: Cell },

    #[error("cell {cell} is a mine but its constraint has no mines left to account for it")]
    MineUnderflow { cell: Cell },

    #[error("constraint requires {count} mines among only {cells} cells")]
    Overcommitted { count: usize, cells: usize },

    #[error("cell {cell} reports {count} nearby mines but {known_mines} are already known")]
    ObservationMismatch {
        cell: Cell,
        count: usize,
        known_mines: usize,
    },

    #[error("subset with {subset_count} mines inside a superset with only {superset_count}")]
    NegativeDerivation {
        subset_count: usize,
        superset_count: usize,
    },
}
