use crate::domains::path_planning::{Cell, GridMap, OccupancyForecast, Pathfinder};
use crate::domains::robot::{Robot, RobotId, RouteOracle};
use std::collections::HashSet;

/// Route oracle for one robot: the shared grid plus every other robot's forecast.
pub struct FleetNavigator<'a> {
    grid: &'a GridMap,
    pathfinder: &'a Pathfinder,
    forecast: OccupancyForecast,
    approach_depth: usize,
}

impl<'a> FleetNavigator<'a> {
    pub fn new(grid: &'a GridMap, pathfinder: &'a Pathfinder, forecast: OccupancyForecast, approach_depth: usize) -> Self {
        Self {
            grid,
            pathfinder,
            forecast,
            approach_depth,
        }
    }
}

impl RouteOracle for FleetNavigator<'_> {
    fn approach_cell(&self, target: Cell, from: Cell) -> Option<Cell> {
        self.grid.nearest_walkable(target, from, self.approach_depth)
    }

    fn plan_route(&self, start: Cell, goal: Cell, avoid: Option<Cell>) -> Vec<Cell> {
        self.pathfinder.route_timed(self.grid, start, goal, &self.forecast, avoid)
    }

    fn static_route(&self, start: Cell, goal: Cell) -> Vec<Cell> {
        self.pathfinder.route(self.grid, start, goal, &HashSet::new())
    }
}

/// Forecasts of every robot except `except`.
pub fn fleet_forecast(robots: &[Robot], except: RobotId) -> OccupancyForecast {
    OccupancyForecast::new(
        robots
            .iter()
            .filter(|r| r.id != except)
            .map(|r| r.forecast())
            .collect(),
    )
}
