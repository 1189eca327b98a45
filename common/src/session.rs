use crate::agent::Agent;
use crate::board::Board;
use crate::grid::{Cell, Dimensions};
use rand::Rng;
use tracing::{info, warn};

/// Settings for a single game.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub height: usize,
    pub width: usize,
    pub mines: usize,
    /// Seed for mine placement and guesses. `None` draws from system entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            height: 8,
            width: 8,
            mines: 8,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.height, self.width)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.height == 0 || self.width == 0 {
            anyhow::bail!("board must have at least one row and one column");
        }
        if self.mines > self.height * self.width {
            anyhow::bail!(
                "{} mines do not fit on a {}x{} board",
                self.mines,
                self.height,
                self.width
            );
        }
        Ok(())
    }
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// How the agent arrived at the cell it played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// The cell was proven safe.
    Safe(Cell),
    /// No proven-safe cell was left, so the agent guessed.
    Random(Cell),
}

impl Move {
    pub fn cell(&self) -> Cell {
        match *self {
            Move::Safe(cell) | Move::Random(cell) => cell,
        }
    }
}

/// One game: a hidden board and the agent playing it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub board: Board,
    pub agent: Agent,
    pub game_state: GameState,
    /// The mine the agent stepped on, if it lost.
    pub exploded: Option<Cell>,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(config: &SessionConfig, rng: &mut R) -> anyhow::Result<Self> {
        config.validate()?;
        let board = Board::random(config.dimensions(), config.mines, rng)?;
        Ok(Session::from_board(board))
    }

    pub fn from_board(board: Board) -> Self {
        Session {
            agent: Agent::new(board.dimensions()),
            board,
            game_state: GameState::Playing,
            exploded: None,
        }
    }

    /// Deserializes a session from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the session to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Plays a single move.
    ///
    /// 1. Picks a proven-safe cell, or guesses if there is none.
    /// 2. Reveals it on the board; a mine ends the game.
    /// 3. Feeds the neighbor count to the agent and flags any mines it now knows.
    /// 4. Checks for a win.
    ///
    /// Returns `Ok(None)` when the agent has no cell left to try.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<Option<Move>> {
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        let chosen = match self.agent.make_safe_move() {
            Some(cell) => Move::Safe(cell),
            None => match self.agent.make_random_move(rng) {
                Some(cell) => Move::Random(cell),
                None => {
                    info!("no moves left to make");
                    return Ok(None);
                }
            },
        };
        let cell = chosen.cell();

        if self.board.is_mine(cell) {
            info!(%cell, "hit a mine");
            self.game_state = GameState::Lost;
            self.exploded = Some(cell);
            return Ok(Some(chosen));
        }

        let count = self.board.nearby_mines(cell);
        if let Err(e) = self.agent.add_knowledge(cell, count as usize) {
            warn!(%cell, count, error = %e, "knowledge base is inconsistent");
            return Err(e.into());
        }
        info!(?chosen, count, "revealed");

        for &mine in self.agent.mines() {
            self.board.flag(mine);
        }

        if self.check_win_condition() {
            info!(moves = self.agent.moves_made().len(), "won");
            self.game_state = GameState::Won;
        }

        Ok(Some(chosen))
    }

    /// Steps until the game ends or the agent runs out of moves.
    pub fn play<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<GameState> {
        while self.game_state == GameState::Playing {
            if self.step(rng)?.is_none() {
                break;
            }
        }
        Ok(self.game_state)
    }

    /// Won once every mine is flagged or every safe cell has been revealed.
    pub fn check_win_condition(&self) -> bool {
        let safe_cells = self.board.dimensions().len() - self.board.mines().len();
        self.board.won() || self.agent.moves_made().len() == safe_cells
    }

    /// Per-cell view in row-major order: `-1` hidden, `-2` known mine,
    /// `-3` the exploded mine, `0..=8` a revealed neighbor count.
    pub fn cells_view(&self) -> Vec<i8> {
        self.board
            .dimensions()
            .cells()
            .map(|cell| {
                if self.exploded == Some(cell) {
                    -3
                } else if self.agent.moves_made().contains(&cell) {
                    self.board.nearby_mines(cell) as i8
                } else if self.agent.mines().contains(&cell) {
                    -2
                } else {
                    -1
                }
            })
            .collect()
    }
}
