//! A minesweeper player that reasons only from certainties.
//!
//! The [`Agent`] keeps a knowledge base of [`Constraint`]s, each saying that
//! exactly some number of a set of cells are mines. Observations shrink and
//! combine these constraints until individual cells are proven safe or proven
//! to be mines. [`Board`] and [`Session`] supply the hidden layout and the
//! loop that drives the agent through a game.

pub mod agent;
pub mod board;
pub mod constraint;
pub mod error;
pub mod grid;
pub mod session;

pub use agent::Agent;
pub use board::Board;
pub use constraint::Constraint;
pub use error::KnowledgeError;
pub use grid::{Cell, Dimensions};
pub use session::{GameState, Move, Session, SessionConfig};
