//! Grid routing for robots.
//!
//! Two searches share the same contract: a route is the ordered list of cells
//! from `start` to `goal` inclusive, and an empty route means "unreachable".
//! The pathfinder never fails loudly; retry and side-step policy belong to the
//! caller.
//!
//! - [`Pathfinder::route`] is plain A* over cells with a fixed obstacle set.
//! - [`Pathfinder::route_timed`] searches `(cell, time)` states so it can
//!   avoid cells other agents are predicted to occupy at a given tick.
//!
//! Both use the Manhattan heuristic (admissible for unit-cost axis moves) and
//! the `pathfinding` crate's A*, whose queue ordering is deterministic.

use std::collections::HashSet;

use pathfinding::prelude::astar;

use super::forecast::OccupancyForecast;
use super::grid::GridMap;
use super::types::Cell;

pub const DEFAULT_MAX_TIME_DEPTH: usize = 50;

#[derive(Debug, Clone)]
pub struct Pathfinder {
    max_time_depth: usize,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TIME_DEPTH)
    }
}

impl Pathfinder {
    pub fn new(max_time_depth: usize) -> Self {
        Self { max_time_depth }
    }

    pub fn max_time_depth(&self) -> usize {
        self.max_time_depth
    }

    /// Single-agent A*. A neighbour is a candidate when it is walkable (or is
    /// the goal itself) and not listed in `obstacles`.
    pub fn route(&self, grid: &GridMap, start: Cell, goal: Cell, obstacles: &HashSet<Cell>) -> Vec<Cell> {
        let result = astar(
            &start,
            |&cell| {
                grid.neighbors(cell)
                    .filter(|n| (grid.is_walkable(*n) || *n == goal) && !obstacles.contains(n))
                    .map(|n| (n, 1u32))
                    .collect::<Vec<_>>()
            },
            |cell| cell.manhattan(&goal),
            |cell| *cell == goal,
        );
        result.map(|(path, _)| path).unwrap_or_default()
    }

    /// Time-expanded A*. Each expansion advances time by one tick; besides the
    /// four axis moves an agent may wait in place. A state `(cell, t)` is
    /// rejected when `forecast` predicts another agent on `cell` at `t` or
    /// `t - 1` (a cell is only entered once it has been cleared), or when
    /// `t == 1` and `cell` is the caller's `forbidden_first_step`.
    ///
    /// States deeper than the configured time depth are not expanded, so the
    /// returned route is the first goal state reached within the cap, or empty.
    pub fn route_timed(
        &self,
        grid: &GridMap,
        start: Cell,
        goal: Cell,
        forecast: &OccupancyForecast,
        forbidden_first_step: Option<Cell>,
    ) -> Vec<Cell> {
        let max_depth = self.max_time_depth;
        if start != goal && !self.goal_reachable_in_time(start, goal, forecast) {
            return Vec::new();
        }
        let result = astar(
            &(start, 0usize),
            |&(cell, time)| {
                if time >= max_depth {
                    return Vec::new();
                }
                let next_time = time + 1;
                let moves = grid
                    .neighbors(cell)
                    .filter(|n| grid.is_walkable(*n) || *n == goal)
                    .chain(std::iter::once(cell));
                moves
                    .filter(|n| !(next_time == 1 && forbidden_first_step == Some(*n)))
                    .filter(|n| !forecast.is_occupied(*n, next_time) && !forecast.is_occupied(*n, time))
                    .map(|n| ((n, next_time), 1u32))
                    .collect::<Vec<_>>()
            },
            |(cell, _)| cell.manhattan(&goal),
            |(cell, _)| *cell == goal,
        );
        result
            .map(|(states, _)| states.into_iter().map(|(cell, _)| cell).collect())
            .unwrap_or_default()
    }

    /// Cheap rejection before the timed search: the goal is farther than the
    /// time depth, or it is occupied at every tick the search could arrive.
    fn goal_reachable_in_time(&self, start: Cell, goal: Cell, forecast: &OccupancyForecast) -> bool {
        let earliest = start.manhattan(&goal) as usize;
        if earliest > self.max_time_depth {
            return false;
        }
        (earliest.max(1)..=self.max_time_depth).any(|time| !forecast.is_occupied(goal, time))
    }
}
