mod grid;
pub use grid::*;
mod connect4;
pub use connect4::*;
mod othello;
pub use othello::*;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::GameKind;

/// One of the two sides of a game.
/// For othello `One` is black and moves first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn cell(self) -> Cell {
        Cell::Occupied(self)
    }
}

/// The outcome of a game.
/// If the game did not end the outcome is `None`.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Outcome {
    None,
    Match,
    Winner(Player),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: String, reason: &'static str },
    #[error("invalid board: {0}")]
    InvalidBoard(String),
    #[error("the {agent:?} agent cannot play {request:?}")]
    WrongGame { agent: GameKind, request: GameKind },
}

impl GameError {
    pub fn illegal(mv: impl Debug, reason: &'static str) -> GameError {
        GameError::IllegalMove {
            mv: format!("{mv:?}"),
            reason,
        }
    }
}

/// Rules of a two player board game.
///
/// Implementations are immutable values, `apply` returns a new state.
pub trait Game: Clone + Debug {
    type Move: Copy + PartialEq + Debug;

    /// All legal moves of `player` in search order.
    fn legal_moves(&self, player: Player) -> Vec<Self::Move>;

    /// Returns the state after `player` played `mv`.
    fn apply(&self, mv: Self::Move, player: Player) -> Result<Self, GameError>;

    fn outcome(&self) -> Outcome;

    /// Number of occupied cells, used for phase dependent decisions.
    fn stones(&self) -> usize;
}
