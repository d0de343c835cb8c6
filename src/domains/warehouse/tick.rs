use super::aggregate::Warehouse;
use super::dispatch::Phase;
use super::events::WarehouseEvent;
use crate::common::{DomainError, DomainResult};
use crate::domains::path_planning::{arbitrate, Cell, MoveDecision, MoveRequest, YieldReason};
use crate::domains::robot::{GotoOutcome, RobotId};
use chrono::Utc;

impl Warehouse {
    /// One simulation step. With `should_move` false only dispatch runs.
    ///
    /// Order within a moving tick: arbitrate every robot's next step, commit
    /// granted moves, fulfill at arrivals, remediate denied robots, retry
    /// robots waiting for a route, then dispatch queued work.
    pub fn tick(&mut self, should_move: bool) {
        if should_move {
            self.tick += 1;
            self.advance_robots();
            self.retry_waiting_robots();
        }
        self.assign_tasks();
    }

    fn advance_robots(&mut self) {
        let requests: Vec<MoveRequest> = self
            .robots
            .iter()
            .map(|r| MoveRequest::new(r.id, r.position(), r.next_step()))
            .collect();
        let decisions = arbitrate(&requests);

        let mut arrivals = Vec::new();
        let mut denied = Vec::new();
        for idx in 0..self.robots.len() {
            let robot = &mut self.robots[idx];
            let from = robot.position();
            match decisions.get(&robot.id).copied().unwrap_or(MoveDecision::Stay) {
                MoveDecision::Granted(to) => {
                    let robot_id = robot.id;
                    if robot.advance() && !robot.is_waiting_for_route() {
                        arrivals.push(idx);
                    }
                    self.record(WarehouseEvent::RobotMoved {
                        warehouse_id: self.id.clone(),
                        robot_id,
                        from,
                        to,
                        tick: self.tick,
                        timestamp: Utc::now(),
                    });
                }
                MoveDecision::Stay => {
                    // Planned wait step.
                    if robot.next_step() == Some(from) && robot.advance() {
                        arrivals.push(idx);
                    }
                }
                MoveDecision::Denied(reason) => {
                    if let Some(desired) = robot.next_step() {
                        denied.push((idx, reason, desired));
                    }
                }
            }
        }

        for idx in arrivals {
            self.drive(idx, Phase::Arrived);
        }
        for (idx, reason, desired) in denied {
            self.resolve_yield(idx, reason, desired);
        }
    }

    /// Denied robots either push a standing blocker aside or, after enough
    /// consecutive denials (immediately for a swap), re-plan with the contested
    /// cell forbidden as their first step.
    fn resolve_yield(&mut self, idx: usize, reason: YieldReason, desired: Cell) {
        self.record(WarehouseEvent::RobotYielded {
            warehouse_id: self.id.clone(),
            robot_id: self.robots[idx].id,
            reason,
            tick: self.tick,
            timestamp: Utc::now(),
        });
        // The path may have changed if the robot arrived or was re-planned meanwhile.
        if self.robots[idx].next_step() != Some(desired) {
            return;
        }
        if self.robots[idx].is_detouring() {
            self.robots[idx].cancel_detour();
            return;
        }
        // A follower whose leader moved on this tick just enters a tick later.
        if let YieldReason::Blocked { by } = reason {
            let still_there = self.robot_index(by).map(|b| self.robots[b].position()) == Some(desired);
            if !still_there {
                return;
            }
        }

        let blocker = match reason {
            YieldReason::Contention { .. } => None,
            YieldReason::Swap { with } => Some(with),
            YieldReason::Blocked { by } => Some(by),
        };
        if let Some(blocker_idx) = blocker.and_then(|id| self.robot_index(id)) {
            if self.robots[blocker_idx].can_step_aside() {
                let name = self.robots[idx].name.clone();
                self.logger.info(&format!("{} is blocked by {}, moving it", name, self.robots[blocker_idx].name));
                self.scatter(blocker_idx);
                self.robots[idx].record_blocked();
                return;
            }
        }

        let blocked_for = self.robots[idx].record_blocked();
        let forced = matches!(reason, YieldReason::Swap { .. });
        if forced || blocked_for >= self.settings.replan_after_blocked_ticks {
            let name = self.robots[idx].name.clone();
            self.logger.info(&format!("{} blocked at {}. replanning...", name, desired));
            let outcome = self.with_navigator(idx, |robot, nav| robot.replan(nav, Some(desired)));
            self.settle_outcome(idx, outcome);
        }
    }

    /// Robots whose last plan found every route occupied try again. After too
    /// many failures a robot carrying stock steps aside to break the jam, and
    /// a pickup goes back to the end of its queue while its robot steps aside
    /// before taking new work.
    fn retry_waiting_robots(&mut self) {
        for idx in 0..self.robots.len() {
            if !self.robots[idx].is_waiting_for_route() {
                continue;
            }
            let retries = self.robots[idx].record_plan_retry();
            let outcome = self.with_navigator(idx, |robot, nav| robot.replan(nav, None));
            if outcome != GotoOutcome::Blocked || retries <= self.settings.max_plan_retries {
                self.settle_outcome(idx, outcome);
                continue;
            }
            let carrying = self.robots[idx]
                .current_task()
                .map(|t| !t.is_pickup())
                .unwrap_or(false);
            if carrying {
                if !self.scatter(idx) {
                    self.settle_outcome(idx, outcome);
                }
            } else {
                self.abandon(idx, "route blocked for too long", true);
                self.scatter(idx);
            }
        }
    }

    /// Operator jog: sends an idle robot one cell in any axis direction.
    pub fn nudge_robot(&mut self, id: RobotId, to: Cell) -> DomainResult<()> {
        let idx = self.robot_index(id).ok_or_else(|| DomainError::InvalidCommand {
            reason: format!("no robot with id {}", id),
        })?;
        let robot = &self.robots[idx];
        if !robot.is_available() {
            return Err(DomainError::InvalidCommand {
                reason: format!("{} is busy", robot.name),
            });
        }
        if robot.position().manhattan(&to) != 1 {
            return Err(DomainError::InvalidCommand {
                reason: format!("{} is not next to {}", to, robot.position()),
            });
        }
        if !self.grid.in_bounds(to) {
            return Err(DomainError::OutOfBounds { cell: to });
        }
        if !self.grid.is_walkable(to) {
            return Err(DomainError::CellOccupied { cell: to });
        }
        self.robots[idx].side_step(to);
        Ok(())
    }
}
