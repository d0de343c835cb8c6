use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an agent moving on the grid.
pub type AgentId = u32;

/// A grid coordinate. Serialized as a `[row, col]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

/// Axis moves in expansion order: right, down, left, up.
pub const AXIS_MOVES: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn manhattan(&self, other: &Cell) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The four axis neighbours, without bounds checking.
    pub fn axis_neighbors(&self) -> [Cell; 4] {
        AXIS_MOVES.map(|(dr, dc)| Cell::new(self.row + dr, self.col + dc))
    }

    /// True when `other` is this cell or one of its axis neighbours.
    pub fn is_adjacent_or_same(&self, other: &Cell) -> bool {
        self.manhattan(other) <= 1
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Cell::new(row, col)
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
