use crate::domains::path_planning::Cell;

/// Planning port a robot routes through. The warehouse implements it with a
/// view of the grid and of every other robot's predicted position.
pub trait RouteOracle {
    /// Walkable cell to stand on when serving `target`, nearest to `from`.
    fn approach_cell(&self, target: Cell, from: Cell) -> Option<Cell>;

    /// Collision-aware route from `start` to `goal`, both inclusive. Empty when none.
    fn plan_route(&self, start: Cell, goal: Cell, avoid: Option<Cell>) -> Vec<Cell>;

    /// Route ignoring other robots. Empty means the goal can never be reached.
    fn static_route(&self, start: Cell, goal: Cell) -> Vec<Cell>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoOutcome {
    /// A route was planned; the robot is moving.
    EnRoute,
    /// Already standing on the goal.
    Arrived,
    /// Reachable in principle but every route is currently occupied.
    Blocked,
    /// No route exists even ignoring other robots.
    Unreachable,
    /// No walkable cell near the target.
    NoApproach,
}
