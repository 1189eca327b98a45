use crate::constraint::Constraint;
use crate::error::KnowledgeError;
use crate::grid::{Cell, Dimensions};
use itertools::iproduct;
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::HashSet;
use tracing::{debug, trace};

/// A minesweeper player that only acts on what it knows for certain.
///
/// The agent is fed one observation per revealed cell and keeps a knowledge
/// base of constraints over the cells it has not resolved yet. Every cell it
/// proves safe or proves to be a mine is removed from all constraints at once,
/// so the constraints never mention a resolved cell.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Agent {
    dims: Dimensions,
    /// Cells that have been chosen and observed.
    moves_made: HashSet<Cell>,
    /// Cells proven not to contain a mine.
    safes: HashSet<Cell>,
    /// Cells proven to contain a mine.
    mines: HashSet<Cell>,
    /// Active constraints, in insertion order.
    knowledge: Vec<Constraint>,
}

impl Agent {
    pub fn new(dims: Dimensions) -> Self {
        Agent {
            dims,
            moves_made: HashSet::new(),
            safes: HashSet::new(),
            mines: HashSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn knowledge(&self) -> &[Constraint] {
        &self.knowledge
    }

    /// Records `cell` as a mine and removes it from every constraint.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<(), KnowledgeError> {
        if self.safes.contains(&cell) {
            return Err(KnowledgeError::ConflictingMark { cell });
        }
        if self.mines.insert(cell) {
            debug!(%cell, "marked mine");
        }
        for constraint in &mut self.knowledge {
            constraint.mark_mine(cell)?;
        }
        Ok(())
    }

    /// Records `cell` as safe and removes it from every constraint.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<(), KnowledgeError> {
        if self.mines.contains(&cell) {
            return Err(KnowledgeError::ConflictingMark { cell });
        }
        if self.safes.insert(cell) {
            debug!(%cell, "marked safe");
        }
        for constraint in &mut self.knowledge {
            constraint.mark_safe(cell)?;
        }
        Ok(())
    }

    /// Ingests one observation: `cell` was revealed safe and has `count`
    /// mines among its neighbors.
    ///
    /// Runs a single trivial-resolution pass followed by a single
    /// subset-resolution pass. Facts that only become derivable because of
    /// this call's own deductions surface on the next call, not this one.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) -> Result<(), KnowledgeError> {
        if !self.dims.contains(cell) {
            return Err(KnowledgeError::OutOfBounds { cell });
        }

        // Constraints that mention `cell` before it is resolved are the ones
        // this observation can relate to each other.
        let touched: Vec<usize> = self
            .knowledge
            .iter()
            .enumerate()
            .filter(|(_, constraint)| constraint.contains(cell))
            .map(|(i, _)| i)
            .collect();

        self.moves_made.insert(cell);
        self.mark_safe(cell)?;

        let observed = self.observe(cell, count)?;
        debug!(%cell, count, constraint = %observed, "observation");
        if !observed.is_empty() {
            self.knowledge.push(observed);
        }

        let related: Vec<Constraint> = touched.iter().map(|&i| self.knowledge[i].clone()).collect();

        self.resolve_trivial()?;
        self.resolve_subsets(&related)?;

        Ok(())
    }

    /// Builds the constraint for an observation over the neighbors whose
    /// status is still unknown. Known mines are dropped along with the mine
    /// each of them accounts for.
    fn observe(&self, cell: Cell, count: usize) -> Result<Constraint, KnowledgeError> {
        let mut unresolved = Vec::new();
        let mut known_mines = 0;

        for neighbor in self.dims.neighbors(cell) {
            if self.safes.contains(&neighbor) {
                continue;
            }
            if self.mines.contains(&neighbor) {
                known_mines += 1;
            } else {
                unresolved.push(neighbor);
            }
        }

        let remaining = count
            .checked_sub(known_mines)
            .ok_or(KnowledgeError::ObservationMismatch {
                cell,
                count,
                known_mines,
            })?;
        Constraint::new(unresolved, remaining)
    }

    /// One pass over the constraints present when the pass starts.
    ///
    /// Each is checked when it is reached, so marks made earlier in the pass
    /// are visible to later constraints. A constraint already passed over
    /// that becomes trivial waits for the next pass.
    fn resolve_trivial(&mut self) -> Result<(), KnowledgeError> {
        let pass_len = self.knowledge.len();
        let mut resolved = vec![false; pass_len];
        trace!(constraints = pass_len, "trivial resolution pass");

        for i in 0..pass_len {
            let constraint = &self.knowledge[i];
            if let Some(mines) = constraint.known_mines() {
                let mines: Vec<Cell> = mines.iter().copied().collect();
                for mine in mines {
                    self.mark_mine(mine)?;
                }
                resolved[i] = true;
            } else if let Some(safes) = constraint.known_safes() {
                let safes: Vec<Cell> = safes.iter().copied().collect();
                for safe in safes {
                    self.mark_safe(safe)?;
                }
                resolved[i] = true;
            }
        }

        // Constraints emptied by marks carry nothing and go as well.
        let mut index = 0;
        self.knowledge.retain(|constraint| {
            let keep = !resolved.get(index).copied().unwrap_or(false) && !constraint.is_empty();
            index += 1;
            keep
        });
        Ok(())
    }

    /// Subtracts every subset from every superset among `related`, appending
    /// the differences as new constraints. Derived constraints are not
    /// simplified further in this call.
    fn resolve_subsets(&mut self, related: &[Constraint]) -> Result<(), KnowledgeError> {
        trace!(constraints = related.len(), "subset resolution pass");

        for (subset, superset) in iproduct!(related, related) {
            if subset == superset {
                continue;
            }
            let Some(derived) = subset.subtract_from(superset) else {
                continue;
            };
            let mut derived = derived?;

            // Facts learned earlier in this call may already cover some cells.
            let known: Vec<Cell> = derived
                .cells()
                .iter()
                .copied()
                .filter(|c| self.mines.contains(c) || self.safes.contains(c))
                .collect();
            for cell in known {
                if self.mines.contains(&cell) {
                    derived.mark_mine(cell)?;
                } else {
                    derived.mark_safe(cell)?;
                }
            }

            if derived.is_empty() || self.knowledge.contains(&derived) {
                continue;
            }
            debug!(from = %superset, minus = %subset, derived = %derived, "subset resolution");
            self.knowledge.push(derived);
        }
        Ok(())
    }

    /// A cell known to be safe that has not been played yet. Picks the
    /// lowest `(row, col)` so repeated calls agree.
    pub fn make_safe_move(&self) -> Option<Cell> {
        self.safes.difference(&self.moves_made).min().copied()
    }

    /// Any cell that has not been played and is not a known mine, chosen
    /// uniformly at random.
    pub fn make_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = self
            .dims
            .cells()
            .filter(|c| !self.moves_made.contains(c) && !self.mines.contains(c))
            .collect();
        candidates.choose(rng).copied()
    }
}
