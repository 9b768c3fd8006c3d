use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::{Add, Neg, Sub};

use crate::agents::Agent;
use crate::game::Player;

/// Cell coordinate, row 0 is the top row.
#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: i16,
    pub col: i16,
}

impl Pos {
    pub const fn new(row: i16, col: i16) -> Pos {
        Pos { row, col }
    }

    pub fn apply(self, d: Direction) -> Pos {
        self + d.into()
    }

    pub fn within(self, width: usize, height: usize) -> bool {
        0 <= self.col && self.col < width as _ && 0 <= self.row && self.row < height as _
    }
}

/// Shorthand for `Pos::new`.
pub const fn pos(row: i16, col: i16) -> Pos {
    Pos::new(row, col)
}

impl From<(i16, i16)> for Pos {
    fn from(val: (i16, i16)) -> Self {
        Pos::new(val.0, val.1)
    }
}

impl From<Direction> for Pos {
    fn from(d: Direction) -> Self {
        match d {
            Direction::North => Pos::new(-1, 0),
            Direction::NorthEast => Pos::new(-1, 1),
            Direction::East => Pos::new(0, 1),
            Direction::SouthEast => Pos::new(1, 1),
            Direction::South => Pos::new(1, 0),
            Direction::SouthWest => Pos::new(1, -1),
            Direction::West => Pos::new(0, -1),
            Direction::NorthWest => Pos::new(-1, -1),
        }
    }
}

impl Add for Pos {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            row: self.row + other.row,
            col: self.col + other.col,
        }
    }
}

impl Sub for Pos {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            row: self.row - other.row,
            col: self.col - other.col,
        }
    }
}

impl Neg for Pos {
    type Output = Pos;

    fn neg(self) -> Self::Output {
        Self {
            row: -self.row,
            col: -self.col,
        }
    }
}

/// The eight compass directions, north is towards row 0.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub fn iter() -> impl Iterator<Item = Direction> {
        [
            Direction::North,
            Direction::NorthEast,
            Direction::East,
            Direction::SouthEast,
            Direction::South,
            Direction::SouthWest,
            Direction::West,
            Direction::NorthWest,
        ]
        .iter()
        .copied()
    }

    /// One direction per line through a cell.
    pub fn axes() -> impl Iterator<Item = Direction> {
        [
            Direction::East,
            Direction::South,
            Direction::SouthEast,
            Direction::NorthEast,
        ]
        .iter()
        .copied()
    }

    pub fn invert(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }
}

/// The game a request is about.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Connect4,
    Othello,
}

/// Board as sent by a client.
///
/// Cells are encoded as `0` (empty), `1` (player one) and `2` (player two),
/// either as nested rows or as a flat row-major array.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum BoardData {
    Rows(Vec<Vec<u8>>),
    Flat(Vec<u8>),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MoveRequest {
    pub game: GameKind,
    pub player: Player,
    pub board: BoardData,
    /// Overrides the default agent of the game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<Agent>,
}

impl MoveRequest {
    /// The configured agent or the default one for the game.
    pub fn agent(&self) -> Agent {
        self.agent
            .clone()
            .unwrap_or_else(|| Agent::for_game(self.game))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<i16>,
    /// No legal move, the caller has to pass or end the game.
    #[serde(default)]
    pub pass: bool,
}

impl MoveResponse {
    pub fn column(column: usize) -> MoveResponse {
        MoveResponse {
            row: None,
            column: Some(column as _),
            pass: false,
        }
    }

    pub fn cell(p: Pos) -> MoveResponse {
        MoveResponse {
            row: Some(p.row),
            column: Some(p.col),
            pass: false,
        }
    }

    pub fn pass() -> MoveResponse {
        MoveResponse {
            row: None,
            column: None,
            pass: true,
        }
    }
}
