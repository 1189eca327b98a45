use crate::grid::{Cell, Dimensions};
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::HashSet;

/// The hidden mine layout of a game.
///
/// This is the side the agent never sees directly: it answers whether a cell
/// is a mine and how many mines surround it, and tracks which mines the
/// player has identified.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Board {
    dims: Dimensions,
    mines: HashSet<Cell>,
    mines_found: HashSet<Cell>,
}

impl Board {
    /// Places `mines` distinct mines uniformly at random.
    pub fn random<R: Rng + ?Sized>(
        dims: Dimensions,
        mines: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        if mines > dims.len() {
            anyhow::bail!(
                "cannot place {} mines on a {}x{} board",
                mines,
                dims.height,
                dims.width
            );
        }
        let mines = dims.cells().choose_multiple(rng, mines).into_iter().collect();
        Ok(Board {
            dims,
            mines,
            mines_found: HashSet::new(),
        })
    }

    /// A board with a fixed mine layout.
    pub fn with_mines(
        dims: Dimensions,
        mines: impl IntoIterator<Item = Cell>,
    ) -> anyhow::Result<Self> {
        let mines: HashSet<Cell> = mines.into_iter().collect();
        if let Some(cell) = mines.iter().find(|&&c| !dims.contains(c)) {
            anyhow::bail!("mine at {} is outside the board", cell);
        }
        Ok(Board {
            dims,
            mines,
            mines_found: HashSet::new(),
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines within one row and column of `cell`, not counting `cell` itself.
    pub fn nearby_mines(&self, cell: Cell) -> u8 {
        self.dims.neighbors(cell).filter(|n| self.is_mine(*n)).count() as u8
    }

    /// Records that the player has identified `cell` as a mine.
    pub fn flag(&mut self, cell: Cell) {
        self.mines_found.insert(cell);
    }

    /// All mines have been flagged, and nothing else has.
    pub fn won(&self) -> bool {
        self.mines_found == self.mines
    }
}
