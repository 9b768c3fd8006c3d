use std::fmt;

use super::{Cell, Game, GameError, Grid, Outcome, Player};
use crate::env::{BoardData, Direction, Pos};

pub const WIDTH: usize = 7;
pub const HEIGHT: usize = 6;
pub const CENTER: usize = WIDTH / 2;
/// Tokens in a row that win the game.
pub const CONNECT: usize = 4;

/// Column order used by the search, center first.
const MOVE_ORDER: [usize; WIDTH] = [3, 2, 4, 1, 5, 0, 6];

/// Connect four board with gravity, row 0 is the top.
#[derive(Clone, PartialEq, Eq)]
pub struct Connect4 {
    pub grid: Grid,
    /// Last placed token if known.
    last: Option<(Pos, Player)>,
}

impl Default for Connect4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Connect4 {
    pub fn new() -> Connect4 {
        Connect4 {
            grid: Grid::new(WIDTH, HEIGHT),
            last: None,
        }
    }

    /// Wraps an existing grid which has to be 6x7 without floating tokens.
    pub fn from_grid(grid: Grid) -> Result<Connect4, GameError> {
        if grid.width != WIDTH || grid.height != HEIGHT {
            return Err(GameError::InvalidBoard(format!(
                "connect four needs {HEIGHT}x{WIDTH} but got {}x{}",
                grid.height, grid.width
            )));
        }
        for col in 0..WIDTH {
            let mut cells = column_cells(col).skip_while(|&p| !grid[p].is_empty());
            if let Some(p) = cells.find(|&p| !grid[p].is_empty()) {
                return Err(GameError::InvalidBoard(format!(
                    "floating token at {}/{}",
                    p.row, p.col
                )));
            }
        }
        Ok(Connect4 { grid, last: None })
    }

    pub fn from_data(data: &BoardData) -> Result<Connect4, GameError> {
        Connect4::from_grid(Grid::from_data(WIDTH, HEIGHT, data)?)
    }

    /// Parses the textual representation of `Grid::parse`.
    pub fn parse(txt: &str) -> Option<Connect4> {
        Connect4::from_grid(Grid::parse(txt)?).ok()
    }

    /// Returns the last placed token if this board was created by `play`.
    pub fn last(&self) -> Option<(Pos, Player)> {
        self.last
    }

    /// Lowest empty row of `col` or `None` if the column is full.
    pub fn drop_row(&self, col: usize) -> Option<usize> {
        if col >= WIDTH {
            return None;
        }
        (0..HEIGHT)
            .rev()
            .find(|&row| self.grid[Pos::new(row as _, col as _)].is_empty())
    }

    pub fn column_full(&self, col: usize) -> bool {
        !self.grid[Pos::new(0, col as _)].is_empty()
    }

    /// Columns that are not full, center first.
    pub fn legal_columns(&self) -> Vec<usize> {
        MOVE_ORDER
            .iter()
            .copied()
            .filter(|&col| !self.column_full(col))
            .collect()
    }

    /// Drops a token of `player` into `col`.
    pub fn play(&self, col: usize, player: Player) -> Result<Connect4, GameError> {
        if col >= WIDTH {
            return Err(GameError::illegal(col, "column out of range"));
        }
        let row = self
            .drop_row(col)
            .ok_or_else(|| GameError::illegal(col, "column is full"))?;
        let p = Pos::new(row as _, col as _);
        Ok(Connect4 {
            grid: self.grid.with(p, player.cell()),
            last: Some((p, player)),
        })
    }

    /// Returns if `player` would win by dropping into `col`.
    pub fn wins_with(&self, col: usize, player: Player) -> bool {
        match self.drop_row(col) {
            Some(row) => is_win(
                &self.grid.with(Pos::new(row as _, col as _), player.cell()),
                Pos::new(row as _, col as _),
                player,
            ),
            None => false,
        }
    }

    /// Columns where `player` wins immediately.
    pub fn winning_columns(&self, player: Player) -> Vec<usize> {
        self.legal_columns()
            .into_iter()
            .filter(|&col| self.wins_with(col, player))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        (0..WIDTH).all(|col| self.column_full(col))
    }

    /// Scans the whole board for four in a row.
    pub fn winner(&self) -> Option<Player> {
        [Player::One, Player::Two]
            .into_iter()
            .find(|&player| has_four(&self.grid, player))
    }
}

/// Returns if the token at `p` is part of at least four in a row.
pub fn is_win(grid: &Grid, p: Pos, player: Player) -> bool {
    if !grid.has(p) || !grid[p].is(player) {
        return false;
    }
    Direction::axes().any(|d| {
        1 + run_length(grid, p, d, player) + run_length(grid, p, d.invert(), player) >= CONNECT
    })
}

/// Number of contiguous `player` cells starting next to `p` in direction `d`.
fn run_length(grid: &Grid, p: Pos, d: Direction, player: Player) -> usize {
    let mut p = p.apply(d);
    let mut len = 0;
    while grid.has(p) && grid[p].is(player) {
        len += 1;
        p = p.apply(d);
    }
    len
}

pub fn has_four(grid: &Grid, player: Player) -> bool {
    grid.positions().any(|p| {
        grid[p].is(player)
            && Direction::axes().any(|d| {
                let mut q = p;
                (1..CONNECT).all(|_| {
                    q = q.apply(d);
                    grid.has(q) && grid[q].is(player)
                })
            })
    })
}

impl Game for Connect4 {
    type Move = usize;

    fn legal_moves(&self, _player: Player) -> Vec<usize> {
        if self.outcome() != Outcome::None {
            return Vec::new();
        }
        self.legal_columns()
    }

    fn apply(&self, mv: usize, player: Player) -> Result<Connect4, GameError> {
        self.play(mv, player)
    }

    fn outcome(&self) -> Outcome {
        let winner = match self.last {
            Some((p, player)) => is_win(&self.grid, p, player).then_some(player),
            None => self.winner(),
        };
        match winner {
            Some(player) => Outcome::Winner(player),
            None if self.is_full() => Outcome::Match,
            None => Outcome::None,
        }
    }

    fn stones(&self) -> usize {
        WIDTH * HEIGHT - self.grid.empty_count()
    }
}

impl fmt::Debug for Connect4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connect4 {:?}", self.grid)?;
        if let Some((p, player)) = self.last {
            write!(f, " last: {player:?} at {}/{}", p.row, p.col)?;
        }
        Ok(())
    }
}

/// Iterates over all positions of a column from bottom to top.
pub fn column_cells(col: usize) -> impl Iterator<Item = Pos> {
    (0..HEIGHT).rev().map(move |row| Pos::new(row as _, col as _))
}

/// Returns if `p` is empty and would be filled by the next drop.
pub fn is_playable(grid: &Grid, p: Pos) -> bool {
    grid.has(p)
        && grid[p] == Cell::Empty
        && (p.row as usize + 1 == grid.height || !grid[Pos::new(p.row + 1, p.col)].is_empty())
}
