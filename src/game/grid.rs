use std::fmt;
use std::ops::Index;

use owo_colors::OwoColorize;

use super::{GameError, Player};
use crate::env::{BoardData, Pos};

/// Represents a single tile of the board
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Player),
}

impl Cell {
    /// Wire encoding: 0 empty, 1 player one, 2 player two.
    pub fn from_u8(v: u8) -> Option<Cell> {
        match v {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Occupied(Player::One)),
            2 => Some(Cell::Occupied(Player::Two)),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Occupied(Player::One) => 1,
            Cell::Occupied(Player::Two) => 2,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(p) => Some(p),
        }
    }

    pub fn is(self, player: Player) -> bool {
        self == Cell::Occupied(player)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Cell::Empty => write!(f, "."),
            Cell::Occupied(Player::One) => write!(f, "{}", "x".red()),
            Cell::Occupied(Player::Two) => write!(f, "{}", "o".yellow()),
        }
    }
}

/// Fixed size board stored row-major, row 0 at the top.
///
/// Boards are values: modifications return a new grid.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Grid {
        Grid {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn has(&self, p: Pos) -> bool {
        p.within(self.width, self.height)
    }

    /// Returns the cell or `None` if outside of the grid.
    pub fn get(&self, row: i16, col: i16) -> Option<Cell> {
        let p = Pos::new(row, col);
        if self.has(p) {
            Some(self[p])
        } else {
            None
        }
    }

    /// Returns a copy with `p` set to `cell`.
    pub fn with(&self, p: Pos, cell: Cell) -> Grid {
        let mut grid = self.clone();
        grid.set(p, cell);
        grid
    }

    pub(crate) fn set(&mut self, p: Pos, cell: Cell) {
        let i = self.index_of(p);
        self.cells[i] = cell;
    }

    pub fn count(&self, player: Player) -> usize {
        self.cells.iter().filter(|c| c.is(player)).count()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let width = self.width;
        (0..self.width * self.height).map(move |i| Pos::new((i / width) as _, (i % width) as _))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Flat row-major wire encoding.
    pub fn to_flat(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.to_u8()).collect()
    }

    pub fn from_flat(width: usize, height: usize, data: &[u8]) -> Result<Grid, GameError> {
        if data.len() != width * height {
            return Err(GameError::InvalidBoard(format!(
                "expected {} cells but got {}",
                width * height,
                data.len()
            )));
        }
        let cells = data
            .iter()
            .map(|&v| {
                Cell::from_u8(v)
                    .ok_or_else(|| GameError::InvalidBoard(format!("unknown cell value {v}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    pub fn from_rows(width: usize, height: usize, rows: &[Vec<u8>]) -> Result<Grid, GameError> {
        if rows.len() != height || rows.iter().any(|r| r.len() != width) {
            return Err(GameError::InvalidBoard(format!(
                "expected {height} rows of {width} cells"
            )));
        }
        let flat: Vec<u8> = rows.iter().flatten().copied().collect();
        Grid::from_flat(width, height, &flat)
    }

    pub fn from_data(width: usize, height: usize, data: &BoardData) -> Result<Grid, GameError> {
        match data {
            BoardData::Rows(rows) => Grid::from_rows(width, height, rows),
            BoardData::Flat(flat) => Grid::from_flat(width, height, flat),
        }
    }

    /// Parses the textual human readable board representation used in tests.
    ///
    /// One line per row, top row first: `.` is empty, `x` player one and `o` player two.
    pub fn parse(txt: &str) -> Option<Grid> {
        let rows: Vec<Vec<Cell>> = txt
            .trim()
            .lines()
            .map(|l| {
                l.split_whitespace()
                    .flat_map(|s| s.chars())
                    .map(|c| match c {
                        'x' | 'X' => Some(Cell::Occupied(Player::One)),
                        'o' | 'O' => Some(Cell::Occupied(Player::Two)),
                        '.' | '_' => Some(Cell::Empty),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()
            })
            .collect::<Option<_>>()?;

        let height = rows.len();
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Grid {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    fn index_of(&self, p: Pos) -> usize {
        assert!(self.has(p), "{p:?} is outside of the grid");
        p.row as usize * self.width + p.col as usize
    }
}

impl Index<Pos> for Grid {
    type Output = Cell;

    fn index(&self, p: Pos) -> &Self::Output {
        &self.cells[self.index_of(p)]
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{")?;
        for row in self.cells.chunks(self.width) {
            write!(f, "  ")?;
            for cell in row {
                write!(f, "{cell:?} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")?;
        Ok(())
    }
}
