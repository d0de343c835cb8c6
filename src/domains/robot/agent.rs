use super::route::{GotoOutcome, RouteOracle};
use crate::domains::inventory::{Inventory, Quantity, StorageEntity, Task, TaskDirection, TaskId};
use crate::domains::path_planning::{AgentForecast, AgentId, Cell};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

pub type RobotId = AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotRole {
    Sorter,
    Picker,
    Generic,
}

impl RobotRole {
    fn label(&self) -> &'static str {
        match self {
            RobotRole::Sorter => "Sorter",
            RobotRole::Picker => "Picker",
            RobotRole::Generic => "Robot",
        }
    }
}

impl fmt::Display for RobotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotState {
    Idle,
    Moving,
}

/// What happened when a robot applied its current task to a storage entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    pub task: Task,
    pub applied: bool,
}

/// A robot on the grid. The warehouse owns identity and role; the robot owns
/// its path, inventory and current task.
#[derive(Debug, Clone)]
pub struct Robot {
    pub id: RobotId,
    pub role: RobotRole,
    pub name: String,
    position: Cell,
    path: VecDeque<Cell>,
    destination: Option<Cell>,
    pending_goal: Option<Cell>,
    current_task: Option<Task>,
    inventory: Inventory,
    state: RobotState,
    blocked_ticks: u32,
    plan_retries: u32,
}

impl Robot {
    pub fn new(id: RobotId, role: RobotRole, position: Cell) -> Self {
        Self {
            id,
            role,
            name: format!("{} #{}", role, id),
            position,
            path: VecDeque::new(),
            destination: None,
            pending_goal: None,
            current_task: None,
            inventory: Inventory::new(),
            state: RobotState::Idle,
            blocked_ticks: 0,
            plan_retries: 0,
        }
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    pub fn path(&self) -> &VecDeque<Cell> {
        &self.path
    }

    pub fn destination(&self) -> Option<Cell> {
        self.destination
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// No task and nowhere to go: ready for dispatch. A robot stepping aside
    /// finishes the step first.
    pub fn is_available(&self) -> bool {
        self.current_task.is_none() && self.path.is_empty()
    }

    /// Has a task but no route yet because the way is temporarily blocked.
    pub fn is_waiting_for_route(&self) -> bool {
        self.pending_goal.is_some() && self.path.is_empty()
    }

    /// Standing still without a route of its own, so another robot may push
    /// it to a neighbouring cell: idle, or waiting for a route.
    pub fn can_step_aside(&self) -> bool {
        self.path.is_empty() && (self.current_task.is_none() || self.pending_goal.is_some())
    }

    /// Has a task but is taking a one-cell side step instead of its route.
    pub fn is_detouring(&self) -> bool {
        !self.path.is_empty() && self.pending_goal.is_some()
    }

    pub fn next_step(&self) -> Option<Cell> {
        self.path.front().copied()
    }

    pub fn forecast(&self) -> AgentForecast {
        AgentForecast::new(self.id, self.position, self.path.iter().copied().collect())
    }

    /// Takes ownership of a task chain. Travel is started separately by the caller.
    pub fn assign(&mut self, task: Task) {
        self.current_task = Some(task);
        self.plan_retries = 0;
    }

    /// Plans toward `target`, stopping on the nearest walkable approach cell
    /// when `target` itself is not walkable.
    pub fn goto(&mut self, target: Cell, oracle: &impl RouteOracle) -> GotoOutcome {
        match oracle.approach_cell(target, self.position) {
            Some(approach) => self.travel_to(approach, oracle, None),
            None => {
                self.stop();
                GotoOutcome::NoApproach
            }
        }
    }

    /// Plans toward exactly `goal`. `avoid` forbids that cell as the first step.
    pub fn travel_to(&mut self, goal: Cell, oracle: &impl RouteOracle, avoid: Option<Cell>) -> GotoOutcome {
        self.destination = Some(goal);
        self.blocked_ticks = 0;
        if goal == self.position {
            self.path.clear();
            self.pending_goal = None;
            self.state = RobotState::Idle;
            return GotoOutcome::Arrived;
        }

        let route = oracle.plan_route(self.position, goal, avoid);
        if route.len() > 1 {
            self.path = route.into_iter().skip(1).collect();
            self.pending_goal = None;
            self.state = RobotState::Moving;
            return GotoOutcome::EnRoute;
        }

        self.path.clear();
        if oracle.static_route(self.position, goal).is_empty() {
            self.stop();
            GotoOutcome::Unreachable
        } else {
            self.pending_goal = Some(goal);
            self.state = RobotState::Moving;
            GotoOutcome::Blocked
        }
    }

    /// Re-plans toward the current destination, discarding the old path.
    pub fn replan(&mut self, oracle: &impl RouteOracle, avoid: Option<Cell>) -> GotoOutcome {
        match self.pending_goal.or(self.destination) {
            Some(goal) => self.travel_to(goal, oracle, avoid),
            None => GotoOutcome::Arrived,
        }
    }

    /// Counts a failed route attempt while waiting; returns the running total.
    pub fn record_plan_retry(&mut self) -> u32 {
        self.plan_retries += 1;
        self.plan_retries
    }

    pub fn record_blocked(&mut self) -> u32 {
        self.blocked_ticks += 1;
        self.blocked_ticks
    }

    /// Moves aside to `cell`. A robot with a task keeps its goal and plans
    /// again from the new cell once the step is done.
    pub fn side_step(&mut self, cell: Cell) {
        if self.current_task.is_some() {
            self.pending_goal = self.pending_goal.or(self.destination);
            self.plan_retries = 0;
        } else {
            self.destination = Some(cell);
            self.pending_goal = None;
        }
        self.path = VecDeque::from([cell]);
        self.state = RobotState::Moving;
    }

    /// Drops a detour that could not be taken; the robot waits for a route again.
    pub fn cancel_detour(&mut self) {
        if self.is_detouring() {
            self.path.clear();
            self.state = RobotState::Moving;
        }
    }

    /// Consumes the head of the path. Returns `true` when the path is exhausted.
    pub fn advance(&mut self) -> bool {
        if let Some(next) = self.path.pop_front() {
            self.position = next;
            self.blocked_ticks = 0;
        }
        if self.path.is_empty() {
            self.state = RobotState::Idle;
            true
        } else {
            false
        }
    }

    /// Applies the current task step to `storage`.
    ///
    /// Pickups need enough stock on the entity and dropoffs enough in the
    /// robot's own inventory; otherwise nothing moves and `applied` is false.
    /// The step is removed from the robot either way and its follow-up, if
    /// any, becomes the current task.
    pub fn fulfill(&mut self, storage: &mut StorageEntity) -> Option<Fulfillment> {
        let mut task = self.current_task.take()?;
        let applied = match task.direction {
            TaskDirection::Pickup => {
                let taken = storage.remove_item(&task.item, task.quantity);
                if taken {
                    self.inventory.add(&task.item, task.quantity);
                }
                taken
            }
            TaskDirection::Dropoff => {
                let dropped = self.inventory.remove(&task.item, task.quantity);
                if dropped {
                    storage.add_item(&task.item, task.quantity);
                }
                dropped
            }
        };
        self.current_task = task.take_follow_up();
        self.plan_retries = 0;
        Some(Fulfillment { task, applied })
    }

    /// Raises the quantity of the current chain if it is still the task `task_id`.
    pub fn raise_task_quantity(&mut self, task_id: TaskId, quantity: Quantity) -> bool {
        match self.current_task.as_mut() {
            Some(task) if task.id == task_id => {
                if quantity > task.quantity {
                    task.set_quantity(quantity);
                }
                true
            }
            _ => false,
        }
    }

    /// Gives up the current task chain and stops where it stands.
    pub fn abandon(&mut self) -> Option<Task> {
        self.stop();
        self.current_task.take()
    }

    fn stop(&mut self) {
        self.path.clear();
        self.pending_goal = None;
        self.destination = None;
        self.state = RobotState::Idle;
        self.blocked_ticks = 0;
    }
}
