use std::cmp::Ordering;
use std::fmt;

use super::{Game, GameError, Grid, Outcome, Player};
use crate::env::{BoardData, Direction, Pos};

pub const SIZE: usize = 8;

pub const CORNERS: [Pos; 4] = [
    Pos::new(0, 0),
    Pos::new(0, SIZE as i16 - 1),
    Pos::new(SIZE as i16 - 1, 0),
    Pos::new(SIZE as i16 - 1, SIZE as i16 - 1),
];

/// Othello board, `Player::One` plays black.
#[derive(Clone, PartialEq, Eq)]
pub struct Othello {
    pub grid: Grid,
}

impl Default for Othello {
    fn default() -> Self {
        Self::new()
    }
}

impl Othello {
    /// Standard start position: d4 and e5 white, d5 and e4 black.
    pub fn new() -> Othello {
        let mut grid = Grid::new(SIZE, SIZE);
        grid.set(Pos::new(3, 3), Player::Two.cell());
        grid.set(Pos::new(4, 4), Player::Two.cell());
        grid.set(Pos::new(3, 4), Player::One.cell());
        grid.set(Pos::new(4, 3), Player::One.cell());
        Othello { grid }
    }

    /// Wraps an existing grid which has to be 8x8.
    pub fn from_grid(grid: Grid) -> Result<Othello, GameError> {
        if grid.width != SIZE || grid.height != SIZE {
            return Err(GameError::InvalidBoard(format!(
                "othello needs {SIZE}x{SIZE} but got {}x{}",
                grid.height, grid.width
            )));
        }
        Ok(Othello { grid })
    }

    pub fn from_data(data: &BoardData) -> Result<Othello, GameError> {
        Othello::from_grid(Grid::from_data(SIZE, SIZE, data)?)
    }

    /// Parses the textual representation of `Grid::parse`.
    pub fn parse(txt: &str) -> Option<Othello> {
        Othello::from_grid(Grid::parse(txt)?).ok()
    }

    /// Opponent discs that would be flipped if `player` placed a disc on `p`.
    /// Empty if the move is illegal.
    pub fn flips(&self, p: Pos, player: Player) -> Vec<Pos> {
        let mut flips = Vec::new();
        if !self.grid.has(p) || !self.grid[p].is_empty() {
            return flips;
        }
        for d in Direction::iter() {
            let start = flips.len();
            let mut q = p.apply(d);
            loop {
                if !self.grid.has(q) || self.grid[q].is_empty() {
                    // Unbracketed run
                    flips.truncate(start);
                    break;
                }
                if self.grid[q].is(player) {
                    break;
                }
                flips.push(q);
                q = q.apply(d);
            }
        }
        flips
    }

    pub fn is_legal(&self, p: Pos, player: Player) -> bool {
        self.grid.has(p)
            && self.grid[p].is_empty()
            && Direction::iter().any(|d| {
                let mut q = p.apply(d);
                let mut crossed = false;
                while self.grid.has(q) && self.grid[q].is(player.opponent()) {
                    crossed = true;
                    q = q.apply(d);
                }
                crossed && self.grid.has(q) && self.grid[q].is(player)
            })
    }

    /// All legal moves of `player` in row-major order.
    pub fn moves(&self, player: Player) -> Vec<Pos> {
        self.grid
            .positions()
            .filter(|&p| self.is_legal(p, player))
            .collect()
    }

    pub fn mobility(&self, player: Player) -> usize {
        self.grid
            .positions()
            .filter(|&p| self.is_legal(p, player))
            .count()
    }

    /// Places a disc and flips all bracketed opponent discs.
    pub fn play(&self, p: Pos, player: Player) -> Result<Othello, GameError> {
        if !self.grid.has(p) {
            return Err(GameError::illegal(p, "outside of the board"));
        }
        if !self.grid[p].is_empty() {
            return Err(GameError::illegal(p, "cell is occupied"));
        }
        let flips = self.flips(p, player);
        if flips.is_empty() {
            return Err(GameError::illegal(p, "no discs to flip"));
        }
        let mut grid = self.grid.with(p, player.cell());
        for q in flips {
            grid.set(q, player.cell());
        }
        Ok(Othello { grid })
    }

    pub fn count(&self, player: Player) -> usize {
        self.grid.count(player)
    }

    pub fn empty_count(&self) -> usize {
        self.grid.empty_count()
    }
}

impl Game for Othello {
    type Move = Pos;

    fn legal_moves(&self, player: Player) -> Vec<Pos> {
        self.moves(player)
    }

    fn apply(&self, mv: Pos, player: Player) -> Result<Othello, GameError> {
        self.play(mv, player)
    }

    fn outcome(&self) -> Outcome {
        if self.mobility(Player::One) > 0 || self.mobility(Player::Two) > 0 {
            return Outcome::None;
        }
        match self.count(Player::One).cmp(&self.count(Player::Two)) {
            Ordering::Greater => Outcome::Winner(Player::One),
            Ordering::Less => Outcome::Winner(Player::Two),
            Ordering::Equal => Outcome::Match,
        }
    }

    fn stones(&self) -> usize {
        SIZE * SIZE - self.grid.empty_count()
    }
}

impl fmt::Debug for Othello {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Othello ({} : {}) {:?}",
            self.count(Player::One),
            self.count(Player::Two),
            self.grid
        )
    }
}
