use serde::{Deserialize, Serialize};

use crate::trace::TraceError;

/// A cell on the square grid, addressed as (row, column).
///
/// Coordinates are signed so that a faulty recording can still be
/// represented; keeping them inside `[0, grid_size)` is a world-model
/// invariant checked by the solver, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct GridPosition {
    pub row: i64,
    pub column: i64,
}

impl GridPosition {
    pub const fn new(row: i64, column: i64) -> Self {
        Self { row, column }
    }

    /// The cell one step away in `direction`, without bounds checking.
    pub fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.offset();
        Self::new(self.row + dr, self.column + dc)
    }

    pub fn in_bounds(self, grid_size: u32) -> bool {
        let n = i64::from(grid_size);
        (0..n).contains(&self.row) && (0..n).contains(&self.column)
    }

    pub fn manhattan_distance(self, other: GridPosition) -> i64 {
        (self.row - other.row).abs() + (self.column - other.column).abs()
    }
}

impl From<[i64; 2]> for GridPosition {
    fn from([row, column]: [i64; 2]) -> Self {
        Self::new(row, column)
    }
}

impl From<GridPosition> for [i64; 2] {
    fn from(pos: GridPosition) -> Self {
        [pos.row, pos.column]
    }
}

impl std::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// One of the four single-cell moves available to the agent.
///
/// The wire encoding is the driver's action code: 0 = north, 1 = east,
/// 2 = south, 3 = west.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn code(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// (row, column) change applied by this move.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = TraceError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Direction::North),
            1 => Ok(Direction::East),
            2 => Ok(Direction::South),
            3 => Ok(Direction::West),
            other => Err(TraceError::InvalidAction { code: other }),
        }
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        direction.code()
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
