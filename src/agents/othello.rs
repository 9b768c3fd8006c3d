use serde::{Deserialize, Serialize};

use super::{select_move, Depth};
use crate::env::{Direction, Pos};
use crate::game::{Game, Grid, Othello, Player, CORNERS, SIZE};
use crate::search::{Heuristic, SearchConfig};

/// Linear evaluation of an othello position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OthelloHeuristic {
    pub corner: f64,
    pub edge: f64,
    /// Discs next to an empty corner.
    pub x_square: f64,
    /// Discs in the central 4x4 square.
    pub center: f64,
    /// Adjacent pairs of own discs.
    pub chain: f64,
    /// Added if the number of empty cells is odd, subtracted otherwise.
    pub parity: f64,
    /// Own legal moves.
    pub mobility: f64,
    /// Legal moves of the opponent.
    pub anticipation: f64,
    /// Per empty corner the opponent can take next to one of our discs.
    pub trap: f64,
    /// Per own disc near the end of the game.
    pub endgame: f64,
    pub endgame_empties: usize,
}

impl Default for OthelloHeuristic {
    fn default() -> Self {
        Self {
            corner: 100.0,
            edge: 10.0,
            x_square: -40.0,
            center: 4.0,
            chain: 1.0,
            parity: 1.0,
            mobility: 5.0,
            anticipation: -5.0,
            trap: -80.0,
            endgame: 2.0,
            endgame_empties: 10,
        }
    }
}

fn is_corner(p: Pos) -> bool {
    CORNERS.contains(&p)
}

fn is_edge(p: Pos) -> bool {
    let last = SIZE as i16 - 1;
    p.row == 0 || p.col == 0 || p.row == last || p.col == last
}

fn is_center(p: Pos) -> bool {
    (2..6).contains(&p.row) && (2..6).contains(&p.col)
}

/// Empty corners next to `p`.
fn empty_corners(grid: &Grid, p: Pos) -> impl Iterator<Item = Pos> + '_ {
    Direction::iter()
        .map(move |d| p.apply(d))
        .filter(move |&q| is_corner(q) && grid[q].is_empty())
}

impl OthelloHeuristic {
    /// Weight of a single disc, the sign is applied by the caller.
    fn disc(&self, grid: &Grid, p: Pos, owner: Player) -> f64 {
        let mut value = 0.0;
        if is_corner(p) {
            value += self.corner;
        } else if is_edge(p) {
            value += self.edge;
        }
        if is_center(p) {
            value += self.center;
        }
        if empty_corners(grid, p).next().is_some() {
            value += self.x_square;
        }
        // Every pair is seen from both discs
        let neighbours = Direction::iter()
            .map(|d| p.apply(d))
            .filter(|q| grid.get(q.row, q.col) == Some(owner.cell()))
            .count();
        value + self.chain * neighbours as f64 / 2.0
    }

    /// Empty corners the opponent can take right now while we own a neighbour.
    fn traps(board: &Othello, player: Player) -> usize {
        CORNERS
            .iter()
            .filter(|&&corner| {
                board.grid[corner].is_empty()
                    && Direction::iter().any(|d| {
                        let q = corner.apply(d);
                        board.grid.get(q.row, q.col) == Some(player.cell())
                    })
                    && board.is_legal(corner, player.opponent())
            })
            .count()
    }
}

impl Heuristic<Othello> for OthelloHeuristic {
    fn eval(&self, game: &Othello, player: Player) -> f64 {
        let grid = &game.grid;
        let mut score = 0.0;
        for p in grid.positions() {
            if let Some(owner) = grid[p].player() {
                let value = self.disc(grid, p, owner);
                score += if owner == player { value } else { -value };
            }
        }

        let empty = game.empty_count();
        score += if empty % 2 == 1 {
            self.parity
        } else {
            -self.parity
        };
        score += self.mobility * game.mobility(player) as f64;
        score += self.anticipation * game.mobility(player.opponent()) as f64;
        score += self.trap * Self::traps(game, player) as f64;
        if empty <= self.endgame_empties {
            score += self.endgame * game.count(player) as f64;
        }
        score
    }
}

/// Othello agent with a fixed depth alpha-beta search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OthelloAgent {
    pub depth: Depth,
    pub pruning: bool,
    pub weights: OthelloHeuristic,
}

impl Default for OthelloAgent {
    fn default() -> Self {
        Self {
            depth: Depth::Fixed(4),
            pruning: true,
            weights: OthelloHeuristic::default(),
        }
    }
}

impl OthelloAgent {
    /// Selects the cell for `player`, `None` if `player` has to pass.
    pub fn select_move(&self, board: &Othello, player: Player) -> Option<Pos> {
        let config = SearchConfig {
            depth: self.depth.resolve(board.stones()),
            pruning: self.pruning,
            heuristic: &self.weights,
        };
        select_move(board, player, &config)
    }
}
