use super::aggregate::Warehouse;
use super::events::WarehouseEvent;
use super::navigation::{fleet_forecast, FleetNavigator};
use super::settings::DispatchPolicy;
use crate::domains::inventory::{Task, TaskDirection, TaskKind};
use crate::domains::path_planning::Cell;
use crate::domains::robot::{GotoOutcome, Robot, RobotRole, RouteOracle};
use chrono::Utc;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Where a robot is in its current task step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Phase {
    /// Task just taken (or a follow-up just became current): travel to it.
    Begin,
    /// Path exhausted: fulfill if close enough, else close the gap.
    Arrived,
}

impl Warehouse {
    /// Hands queue heads to every available robot, in id order.
    pub fn assign_tasks(&mut self) {
        for idx in 0..self.robots.len() {
            while self.robots[idx].is_available() {
                let Some(task) = self.next_task_for(self.robots[idx].role) else {
                    break;
                };
                self.record(WarehouseEvent::TaskAssigned {
                    warehouse_id: self.id.clone(),
                    task_id: task.id,
                    robot_id: self.robots[idx].id,
                    timestamp: Utc::now(),
                });
                self.robots[idx].assign(task);
                self.drive(idx, Phase::Begin);
            }
        }
    }

    fn next_task_for(&mut self, role: RobotRole) -> Option<Task> {
        match (self.settings.dispatch_policy, role) {
            (DispatchPolicy::RoleGated, RobotRole::Sorter) => self.sort_queue.pop_front(),
            (DispatchPolicy::RoleGated, RobotRole::Picker) => self.order_queue.pop_front(),
            _ => self.sort_queue.pop_front().or_else(|| self.order_queue.pop_front()),
        }
    }

    /// Runs `f` on one robot with a navigator that sees every other robot.
    pub(super) fn with_navigator<R>(&mut self, idx: usize, f: impl FnOnce(&mut Robot, &FleetNavigator<'_>) -> R) -> R {
        let forecast = fleet_forecast(&self.robots, self.robots[idx].id);
        let navigator = FleetNavigator::new(&self.grid, &self.pathfinder, forecast, self.settings.approach_search_depth);
        f(&mut self.robots[idx], &navigator)
    }

    /// Advances a robot's task chain until it has to travel or runs out of work.
    pub(super) fn drive(&mut self, idx: usize, mut phase: Phase) {
        loop {
            let robot = &self.robots[idx];
            let Some(target) = robot.current_task().map(|t| t.target) else {
                return;
            };
            let position = robot.position();
            let close_enough = position.is_adjacent_or_same(&target);

            match phase {
                Phase::Begin if close_enough => phase = Phase::Arrived,
                Phase::Begin => {
                    let outcome = self.with_navigator(idx, |robot, nav| robot.goto(target, nav));
                    match outcome {
                        GotoOutcome::Arrived => phase = Phase::Arrived,
                        other => {
                            self.settle_outcome(idx, other);
                            return;
                        }
                    }
                }
                Phase::Arrived if close_enough => {
                    self.fulfill_current(idx);
                    phase = Phase::Begin;
                }
                Phase::Arrived => {
                    if self.robots[idx].destination() == Some(target) {
                        self.abandon(idx, "target not reachable", false);
                        return;
                    }
                    // Only an approach cell was reachable; head for the target itself.
                    let outcome = self.with_navigator(idx, |robot, nav| robot.travel_to(target, nav, None));
                    if outcome != GotoOutcome::Arrived {
                        self.settle_outcome(idx, outcome);
                        return;
                    }
                }
            }
        }
    }

    /// Follows up on a planning result that did not arrive.
    pub(super) fn settle_outcome(&mut self, idx: usize, outcome: GotoOutcome) {
        match outcome {
            GotoOutcome::EnRoute => {}
            GotoOutcome::Arrived => self.drive(idx, Phase::Arrived),
            GotoOutcome::Blocked => {
                let name = self.robots[idx].name.clone();
                self.logger.debug(&format!("{} waiting for a free route", name));
                self.clear_static_route(idx);
            }
            GotoOutcome::Unreachable | GotoOutcome::NoApproach => {
                let robot = &self.robots[idx];
                let goal = robot.destination().or_else(|| robot.current_task().map(|t| t.target));
                let reason = match goal {
                    Some(goal) => format!("could not find path to {}", goal),
                    None => "no approach cell".to_string(),
                };
                self.abandon(idx, &reason, false);
            }
        }
    }

    /// Applies the current step against its storage entity and routes the
    /// side effects back into the warehouse.
    fn fulfill_current(&mut self, idx: usize) {
        let Some(target) = self.robots[idx].current_task().map(|t| t.target) else {
            return;
        };
        let Some(storage) = self.storage.get_mut(&target) else {
            self.abandon(idx, "no storage at target", false);
            return;
        };
        let Some(fulfillment) = self.robots[idx].fulfill(storage) else {
            return;
        };
        let robot_id = self.robots[idx].id;
        let task = fulfillment.task;
        let verb = match task.direction {
            TaskDirection::Pickup => "picked up",
            TaskDirection::Dropoff => "dropped off",
        };
        let line = format!("{}x {} at {}", task.quantity, task.item, target);
        if fulfillment.applied {
            self.logger.info(&format!("{} {} {}", self.robots[idx].name, verb, line));
        } else {
            self.logger.warn(&format!("{} found too little stock, nothing {} ({})", self.robots[idx].name, verb, line));
        }
        self.record(WarehouseEvent::TaskFulfilled {
            warehouse_id: self.id.clone(),
            task_id: task.id,
            robot_id,
            direction: task.direction,
            kind: task.kind,
            item: task.item.clone(),
            quantity: task.quantity,
            applied: fulfillment.applied,
            timestamp: Utc::now(),
        });

        match (task.kind, task.direction) {
            (TaskKind::Sort, TaskDirection::Pickup) => self.release_receiving_transfer(&task),
            (TaskKind::Sort, TaskDirection::Dropoff) if fulfillment.applied => {
                self.auto_ship(&task.item, task.target, task.quantity)
            }
            (TaskKind::Order, TaskDirection::Dropoff) => {
                if let Some(order_id) = task.order_id {
                    self.record_order_fulfillment(order_id, &task.item, task.quantity);
                }
            }
            _ => {}
        }
    }

    /// Drops the robot's task chain. A requeued chain goes to the back of its
    /// queue untouched; a dropped order chain still settles its order line.
    pub(super) fn abandon(&mut self, idx: usize, reason: &str, requeue: bool) {
        let robot_id = self.robots[idx].id;
        let name = self.robots[idx].name.clone();
        let Some(task) = self.robots[idx].abandon() else {
            return;
        };
        let requeued = requeue && task.is_pickup();
        self.logger.warn(&format!("{} gave up task #{} ({}): {}", name, task.id, task.item, reason));
        self.record(WarehouseEvent::TaskAbandoned {
            warehouse_id: self.id.clone(),
            task_id: task.id,
            robot_id,
            reason: reason.to_string(),
            requeued,
            timestamp: Utc::now(),
        });

        if requeued {
            match task.kind {
                TaskKind::Sort => self.sort_queue.push_back(task),
                TaskKind::Order | TaskKind::Generic => self.order_queue.push_back(task),
            }
            return;
        }
        if task.kind == TaskKind::Sort && task.is_pickup() {
            self.release_receiving_transfer(&task);
        }
        if let (TaskKind::Order, Some(order_id)) = (task.kind, task.order_id) {
            self.record_order_fulfillment(order_id, &task.item, task.quantity);
        }
    }

    /// Moves a standing robot to a random free neighbour, away from stations
    /// when possible. Returns false when it is boxed in.
    pub(super) fn scatter(&mut self, idx: usize) -> bool {
        let position = self.robots[idx].position();
        let reserved: HashSet<Cell> = self
            .robots
            .iter()
            .flat_map(|r| std::iter::once(r.position()).chain(r.next_step()))
            .collect();
        let free: Vec<Cell> = self
            .grid
            .neighbors(position)
            .filter(|c| self.grid.is_walkable(*c) && !reserved.contains(c))
            .collect();
        let (aisle, stations): (Vec<Cell>, Vec<Cell>) = free.into_iter().partition(|c| !self.storage.contains_key(c));
        let options = if aisle.is_empty() { stations } else { aisle };
        let name = self.robots[idx].name.clone();
        match options.choose(&mut self.rng).copied() {
            Some(cell) => {
                self.logger.info(&format!("{} moving to {} to clear the way", name, cell));
                self.robots[idx].side_step(cell);
                true
            }
            None => {
                self.logger.warn(&format!("{} is boxed in and cannot step aside", name));
                false
            }
        }
    }

    /// Scatters standing robots parked on the robot's obstacle-free route.
    pub(super) fn clear_static_route(&mut self, idx: usize) {
        let Some(goal) = self.robots[idx].destination() else {
            return;
        };
        let start = self.robots[idx].position();
        let route: HashSet<Cell> = self
            .with_navigator(idx, |_, nav| nav.static_route(start, goal))
            .into_iter()
            .collect();
        let parked: Vec<usize> = self
            .robots
            .iter()
            .enumerate()
            .filter(|(other, r)| *other != idx && r.can_step_aside() && route.contains(&r.position()))
            .map(|(other, _)| other)
            .collect();
        for other in parked {
            self.scatter(other);
        }
    }
}
