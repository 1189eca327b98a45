use crate::error::KnowledgeError;
use crate::grid::Cell;
use std::collections::HashSet;
use std::fmt;

/// A logical sentence about the board: exactly `count` of `cells` are mines.
///
/// `cells` only ever holds cells whose status is still unknown. As facts are
/// learned the affected cells are removed, so `{A, B, C} = 2` with `C` a mine
/// becomes `{A, B} = 1`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Constraint {
    cells: HashSet<Cell>,
    count: usize,
}

impl Constraint {
    /// Builds a constraint, rejecting one that asks for more mines than it has cells.
    pub fn new(
        cells: impl IntoIterator<Item = Cell>,
        count: usize,
    ) -> Result<Self, KnowledgeError> {
        let cells: HashSet<Cell> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(KnowledgeError::Overcommitted {
                count,
                cells: cells.len(),
            });
        }
        Ok(Constraint { cells, count })
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// A constraint over no cells carries no information.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every remaining cell is a mine when the count covers all of them.
    /// The empty constraint is excluded; it is reported by `known_safes` instead.
    pub fn known_mines(&self) -> Option<&HashSet<Cell>> {
        (!self.cells.is_empty() && self.count == self.cells.len()).then_some(&self.cells)
    }

    /// Every remaining cell is safe when no mines are left to place.
    pub fn known_safes(&self) -> Option<&HashSet<Cell>> {
        (self.count == 0).then_some(&self.cells)
    }

    /// Removes a cell now known to be a mine, together with the mine it accounts for.
    /// Does nothing if the cell is not part of this constraint.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<(), KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(());
        }
        let count = self
            .count
            .checked_sub(1)
            .ok_or(KnowledgeError::MineUnderflow { cell })?;
        self.cells.remove(&cell);
        self.count = count;
        Ok(())
    }

    /// Removes a cell now known to be safe; the count is unchanged.
    /// Does nothing if the cell is not part of this constraint.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<(), KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(());
        }
        if self.count >= self.cells.len() {
            return Err(KnowledgeError::Overcommitted {
                count: self.count,
                cells: self.cells.len() - 1,
            });
        }
        self.cells.remove(&cell);
        Ok(())
    }

    /// `{A, B, C} = 1` inside `{A, B, C, D, E} = 2` gives `{D, E} = 1`.
    ///
    /// Returns `None` unless `self` is a subset of `superset`.
    pub fn subtract_from(&self, superset: &Constraint) -> Option<Result<Constraint, KnowledgeError>> {
        if !self.cells.is_subset(&superset.cells) {
            return None;
        }
        let Some(count) = superset.count.checked_sub(self.count) else {
            return Some(Err(KnowledgeError::NegativeDerivation {
                subset_count: self.count,
                superset_count: superset.count,
            }));
        };
        Some(Constraint::new(
            superset.cells.difference(&self.cells).copied(),
            count,
        ))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cells: Vec<&Cell> = self.cells.iter().collect();
        cells.sort();
        write!(f, "{{")?;
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().map(|&(r, c)| Cell::new(r, c)).collect()
    }

    #[test]
    fn test_new_rejects_overcommitted() {
        let err = Constraint::new(cells(&[(0, 0)]), 2).unwrap_err();
        assert_eq!(err, KnowledgeError::Overcommitted { count: 2, cells: 1 });
    }

    #[test]
    fn test_zero_count_yields_all_safes() {
        let c = Constraint::new(cells(&[(0, 0), (0, 1), (1, 1)]), 0).unwrap();
        assert_eq!(c.known_safes(), Some(c.cells()));
        assert_eq!(c.known_mines(), None);
    }

    #[test]
    fn test_full_count_yields_all_mines() {
        let c = Constraint::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        assert_eq!(c.known_mines(), Some(c.cells()));
        assert_eq!(c.known_safes(), None);
    }

    #[test]
    fn test_partial_count_yields_nothing() {
        let c = Constraint::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
        assert_eq!(c.known_mines(), None);
        assert_eq!(c.known_safes(), None);
    }

    #[test]
    fn test_empty_constraint_is_only_safe() {
        let c = Constraint::new(Vec::new(), 0).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.known_mines(), None);
        assert!(c.known_safes().is_some_and(|s| s.is_empty()));
    }

    #[test]
    fn test_mark_mine_decrements() {
        // {A,B,C} = 2 and C is a mine -> {A,B} = 1
        let mut c = Constraint::new(cells(&[(0, 0), (0, 1), (0, 2)]), 2).unwrap();
        c.mark_mine(Cell::new(0, 2)).unwrap();
        assert_eq!(c, Constraint::new(cells(&[(0, 0), (0, 1)]), 1).unwrap());
    }

    #[test]
    fn test_mark_safe_keeps_count() {
        let mut c = Constraint::new(cells(&[(0, 0), (0, 1), (0, 2)]), 2).unwrap();
        c.mark_safe(Cell::new(0, 0)).unwrap();
        assert_eq!(c.count(), 2);
        assert_eq!(c.cells().len(), 2);
        assert!(!c.contains(Cell::new(0, 0)));
    }

    #[test]
    fn test_marks_are_idempotent() {
        let mut once = Constraint::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
        once.mark_mine(Cell::new(0, 1)).unwrap();
        let mut twice = once.clone();
        twice.mark_mine(Cell::new(0, 1)).unwrap();
        assert_eq!(once, twice);

        once.mark_safe(Cell::new(0, 0)).unwrap();
        let mut twice = once.clone();
        twice.mark_safe(Cell::new(0, 0)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_marking_unknown_cell_is_noop() {
        let mut c = Constraint::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        let before = c.clone();
        c.mark_mine(Cell::new(5, 5)).unwrap();
        c.mark_safe(Cell::new(5, 5)).unwrap();
        assert_eq!(c, before);
    }

    #[test]
    fn test_mark_mine_underflow_is_reported() {
        let mut c = Constraint::new(cells(&[(0, 0), (0, 1)]), 0).unwrap();
        let err = c.mark_mine(Cell::new(0, 0)).unwrap_err();
        assert_eq!(err, KnowledgeError::MineUnderflow { cell: Cell::new(0, 0) });
        // Left untouched.
        assert_eq!(c.cells().len(), 2);
    }

    #[test]
    fn test_mark_safe_overcommit_is_reported() {
        let mut c = Constraint::new(cells(&[(0, 0)]), 1).unwrap();
        assert!(matches!(
            c.mark_safe(Cell::new(0, 0)),
            Err(KnowledgeError::Overcommitted { count: 1, cells: 0 })
        ));
    }

    #[test]
    fn test_subtract_from_superset() {
        let small = Constraint::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
        let big = Constraint::new(cells(&[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)]), 2).unwrap();

        let derived = small.subtract_from(&big).unwrap().unwrap();
        assert_eq!(derived, Constraint::new(cells(&[(1, 0), (1, 1)]), 1).unwrap());

        // Not a subset the other way round.
        assert!(big.subtract_from(&small).is_none());
    }

    #[test]
    fn test_subtract_negative_count_is_reported() {
        let small = Constraint::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        let big = Constraint::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
        assert_eq!(
            small.subtract_from(&big),
            Some(Err(KnowledgeError::NegativeDerivation {
                subset_count: 2,
                superset_count: 1
            }))
        );
    }

    #[test]
    fn test_display_is_sorted() {
        let c = Constraint::new(cells(&[(1, 0), (0, 1)]), 1).unwrap();
        assert_eq!(c.to_string(), "{(0, 1), (1, 0)} = 1");
    }
}
