use log::debug;
use serde::{Deserialize, Serialize};

use super::{search_guarded, Depth};
use crate::env::{Direction, Pos};
use crate::game::{
    column_cells, is_playable, is_win, Cell, Connect4, Game, Grid, Player, CENTER, CONNECT,
    HEIGHT,
};
use crate::search::{Heuristic, SearchConfig};

/// Token shape that is strong because it creates multiple threats.
#[derive(Debug, Clone, Copy)]
pub struct Formation {
    pub name: &'static str,
    /// (row, col) offsets from the top left corner of the shape.
    pub cells: &'static [(i16, i16)],
}

pub const FORMATIONS: [Formation; 6] = [
    Formation {
        name: "seven",
        cells: &[(0, 0), (0, 1), (1, 1), (2, 1)],
    },
    Formation {
        name: "mirrored seven",
        cells: &[(0, 0), (0, 1), (1, 0), (2, 0)],
    },
    Formation {
        name: "ell",
        cells: &[(0, 0), (1, 0), (2, 0), (2, 1)],
    },
    Formation {
        name: "mirrored ell",
        cells: &[(0, 1), (1, 1), (2, 1), (2, 0)],
    },
    Formation {
        name: "elbow",
        cells: &[(0, 0), (1, 0), (1, 1)],
    },
    Formation {
        name: "mirrored elbow",
        cells: &[(0, 1), (1, 1), (1, 0)],
    },
];

impl Formation {
    /// Returns if all cells of the shape anchored at `p` belong to `player`.
    pub fn matches(&self, grid: &Grid, p: Pos, player: Player) -> bool {
        self.cells
            .iter()
            .all(|&(row, col)| grid.get(p.row + row, p.col + col) == Some(player.cell()))
    }
}

/// Linear evaluation of a connect four position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Connect4Heuristic {
    /// Windows of four own tokens, the opponents count negative.
    pub four: f64,
    pub three: f64,
    pub two: f64,
    /// Windows with three opponent tokens and one empty cell.
    pub block_three: f64,
    pub block_two: f64,
    /// Per own token in the center column, times its row index + 1.
    pub center: f64,
    /// Four token formations.
    pub formation: f64,
    /// Three token elbows.
    pub elbow: f64,
    /// Per column whose playable cell is right below an opponent winning cell.
    pub gap: f64,
    /// Summed heights of own tokens, scaled by the empty fraction of the board.
    pub height: f64,
}

impl Default for Connect4Heuristic {
    fn default() -> Self {
        Self {
            four: 100_000.0,
            three: 50.0,
            two: 10.0,
            block_three: -80.0,
            block_two: -10.0,
            center: 3.0,
            formation: 15.0,
            elbow: 4.0,
            gap: -40.0,
            height: -0.5,
        }
    }
}

impl Connect4Heuristic {
    fn window(&self, own: usize, opp: usize) -> f64 {
        match (own, opp) {
            (4, 0) => self.four,
            (3, 0) => self.three,
            (2, 0) => self.two,
            (0, 4) => -self.four,
            (0, 3) => self.block_three,
            (0, 2) => self.block_two,
            _ => 0.0,
        }
    }

    fn windows(&self, grid: &Grid, player: Player) -> f64 {
        let mut score = 0.0;
        for p in grid.positions() {
            for d in Direction::axes() {
                let mut cells = [Cell::Empty; CONNECT];
                let mut q = p;
                let mut inside = true;
                for cell in &mut cells {
                    match grid.get(q.row, q.col) {
                        Some(c) => *cell = c,
                        None => {
                            inside = false;
                            break;
                        }
                    }
                    q = q.apply(d);
                }
                if inside {
                    let own = cells.iter().filter(|c| c.is(player)).count();
                    let opp = cells.iter().filter(|c| c.is(player.opponent())).count();
                    score += self.window(own, opp);
                }
            }
        }
        score
    }

    fn center_control(grid: &Grid, player: Player) -> f64 {
        column_cells(CENTER)
            .filter(|&p| grid[p].is(player))
            .map(|p| (p.row + 1) as f64)
            .sum()
    }

    fn formations(&self, grid: &Grid, player: Player) -> f64 {
        let mut score = 0.0;
        for p in grid.positions() {
            for formation in &FORMATIONS {
                if formation.matches(grid, p, player) {
                    score += if formation.cells.len() >= CONNECT {
                        self.formation
                    } else {
                        self.elbow
                    };
                }
            }
        }
        score
    }

    /// Columns where dropping a token lets the opponent win on top of it.
    fn gaps(grid: &Grid, player: Player) -> usize {
        let opponent = player.opponent();
        grid.positions()
            .filter(|&p| p.row > 0 && is_playable(grid, p))
            .filter(|&p| {
                let above = Pos::new(p.row - 1, p.col);
                is_win(&grid.with(above, opponent.cell()), above, opponent)
            })
            .count()
    }

    fn heights(grid: &Grid, player: Player) -> f64 {
        let stacked: i16 = grid
            .positions()
            .filter(|&p| grid[p].is(player))
            .map(|p| HEIGHT as i16 - 1 - p.row)
            .sum();
        let empty = grid.empty_count() as f64 / (grid.width * grid.height) as f64;
        stacked as f64 * empty
    }
}

impl Heuristic<Connect4> for Connect4Heuristic {
    fn eval(&self, game: &Connect4, player: Player) -> f64 {
        let grid = &game.grid;
        self.windows(grid, player)
            + self.center * Self::center_control(grid, player)
            + self.formations(grid, player)
            + self.gap * Self::gaps(grid, player) as f64
            + self.height * Self::heights(grid, player)
    }
}

/// Connect four agent that only searches if there is no obvious move.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Connect4Agent {
    pub depth: Depth,
    pub pruning: bool,
    /// Skip columns that allow the opponent to win on the next move.
    pub safety_filter: bool,
    pub weights: Connect4Heuristic,
}

impl Default for Connect4Agent {
    fn default() -> Self {
        Self {
            depth: Depth::Phased {
                base: 4,
                stones_per_ply: 8,
                ceiling: 7,
            },
            pruning: true,
            safety_filter: true,
            weights: Connect4Heuristic::default(),
        }
    }
}

impl Connect4Agent {
    /// Selects the column for `player`, `None` if there is no legal move.
    ///
    /// Winning and blocking moves are played without searching.
    /// Columns that give the opponent an immediate win are avoided
    /// and the first token goes into the empty center column.
    pub fn select_move(&self, board: &Connect4, player: Player) -> Option<usize> {
        let legal = board.legal_moves(player);
        if legal.is_empty() {
            return None;
        }
        let opponent = player.opponent();

        if let Some(&col) = legal.iter().find(|&&col| board.wins_with(col, player)) {
            debug!(">>> win {col}");
            return Some(col);
        }
        if let Some(&col) = legal.iter().find(|&&col| board.wins_with(col, opponent)) {
            debug!(">>> block {col}");
            return Some(col);
        }

        let mut candidates = legal.clone();
        if self.safety_filter {
            let safe = self.safe_columns(board, player, &legal);
            if !safe.is_empty() {
                candidates = safe;
            }
        }

        if candidates.contains(&CENTER) && column_cells(CENTER).all(|p| board.grid[p].is_empty())
        {
            debug!(">>> center {CENTER}");
            return Some(CENTER);
        }

        let config = SearchConfig {
            depth: self.depth.resolve(board.stones()),
            pruning: self.pruning,
            heuristic: &self.weights,
        };
        search_guarded(board, player, &candidates, &legal, &config)
    }

    /// Columns after which the opponent has no immediate win.
    fn safe_columns(&self, board: &Connect4, player: Player, legal: &[usize]) -> Vec<usize> {
        let opponent = player.opponent();
        legal
            .iter()
            .copied()
            .filter(|&col| match board.play(col, player) {
                Ok(next) => next
                    .legal_columns()
                    .into_iter()
                    .all(|c| !next.wins_with(c, opponent)),
                Err(_) => false,
            })
            .collect()
    }
}
