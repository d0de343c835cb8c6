use super::types::Cell;
use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Terrain {
    Walkable,
    Blocked,
}

/// Static walkability oracle over a rectangular grid. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridMap {
    rows: usize,
    cols: usize,
    cells: Vec<Terrain>,
}

impl GridMap {
    /// Fully walkable grid.
    pub fn open(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Terrain::Walkable; rows * cols],
        }
    }

    /// Build from a row-major layout where `0` is walkable floor and anything else blocks.
    pub fn from_layout(layout: &[Vec<u8>]) -> DomainResult<Self> {
        let rows = layout.len();
        let cols = layout.first().map(|r| r.len()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(DomainError::InvalidLayout {
                reason: "layout must have at least one row and one column".to_string(),
            });
        }
        if let Some(bad) = layout.iter().position(|r| r.len() != cols) {
            return Err(DomainError::InvalidLayout {
                reason: format!("row {} has {} columns, expected {}", bad, layout[bad].len(), cols),
            });
        }
        let cells = layout
            .iter()
            .flat_map(|row| row.iter())
            .map(|&v| if v == 0 { Terrain::Walkable } else { Terrain::Blocked })
            .collect();
        Ok(Self { rows, cols, cells })
    }

    /// Open grid with the given cells blocked.
    pub fn with_blocked(rows: usize, cols: usize, blocked: impl IntoIterator<Item = Cell>) -> DomainResult<Self> {
        let mut grid = Self::open(rows, cols);
        for cell in blocked {
            let idx = grid.index(cell).ok_or(DomainError::OutOfBounds { cell })?;
            grid.cells[idx] = Terrain::Blocked;
        }
        Ok(grid)
    }

    /// Aisle layout: shelves on every odd/odd cell of a `(2r+1) x (2c+1)` grid.
    pub fn storage_aisles(shelf_rows: usize, shelf_cols: usize) -> Self {
        let rows = shelf_rows * 2 + 1;
        let cols = shelf_cols * 2 + 1;
        let cells = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| {
                if r % 2 == 1 && c % 2 == 1 {
                    Terrain::Blocked
                } else {
                    Terrain::Walkable
                }
            })
            .collect();
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some(cell.row as usize * self.cols + cell.col as usize)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.col >= 0 && (cell.row as usize) < self.rows && (cell.col as usize) < self.cols
    }

    fn terrain(&self, cell: Cell) -> Option<Terrain> {
        self.index(cell).map(|i| self.cells[i])
    }

    /// Out-of-bounds cells are never walkable.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.terrain(cell) == Some(Terrain::Walkable)
    }

    /// In-bounds axis neighbours in expansion order.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        cell.axis_neighbors().into_iter().filter(move |n| self.in_bounds(*n))
    }

    /// Blocked cells in row-major order.
    pub fn blocked_cells(&self) -> Vec<Cell> {
        self.cells_with(Terrain::Blocked)
    }

    fn cells_with(&self, terrain: Terrain) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == terrain)
            .map(|(i, _)| Cell::new((i / self.cols) as i32, (i % self.cols) as i32))
            .collect()
    }

    /// Closest walkable cell to `target` within `max_depth` breadth-first steps.
    ///
    /// Returns `target` itself when it is walkable. Among candidates at the
    /// shallowest depth the one nearest to `near` wins; remaining ties keep
    /// discovery order.
    pub fn nearest_walkable(&self, target: Cell, near: Cell, max_depth: usize) -> Option<Cell> {
        if self.is_walkable(target) {
            return Some(target);
        }
        if !self.in_bounds(target) {
            return None;
        }
        let mut seen: HashSet<Cell> = HashSet::from([target]);
        let mut frontier: VecDeque<Cell> = VecDeque::from([target]);
        for _ in 0..max_depth {
            let mut next = VecDeque::new();
            let mut found: Vec<Cell> = Vec::new();
            while let Some(cell) = frontier.pop_front() {
                for n in self.neighbors(cell) {
                    if !seen.insert(n) {
                        continue;
                    }
                    if self.is_walkable(n) {
                        found.push(n);
                    }
                    next.push_back(n);
                }
            }
            if let Some(best) = found.iter().min_by_key(|c| c.manhattan(&near)) {
                return Some(*best);
            }
            frontier = next;
        }
        None
    }
}
