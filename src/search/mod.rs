mod alphabeta;
pub use alphabeta::*;

use std::fmt::Debug;

use crate::game::Player;

pub const WIN: f64 = 1_000_000_000.0;
pub const DRAW: f64 = 0.0;
pub const LOSS: f64 = -1_000_000_000.0;

/// A heuristic that evaluates the game state at the leafs of a tree search.
///
/// Positive values favor `player`. Implementations have to be pure.
pub trait Heuristic<G>: Debug {
    fn eval(&self, game: &G, player: Player) -> f64;
}

/// Parameters of a single search.
/// Created for one move selection and never modified.
#[derive(Debug)]
pub struct SearchConfig<'a, H> {
    pub depth: usize,
    pub pruning: bool,
    pub heuristic: &'a H,
}

impl<H> Clone for SearchConfig<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<H> Copy for SearchConfig<'_, H> {}

impl<'a, H> SearchConfig<'a, H> {
    pub fn new(depth: usize, heuristic: &'a H) -> Self {
        Self {
            depth,
            pruning: true,
            heuristic,
        }
    }

    pub fn pruning(self, pruning: bool) -> Self {
        Self { pruning, ..self }
    }
}
