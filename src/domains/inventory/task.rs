use super::ledger::Quantity;
use super::order::OrderId;
use crate::domains::path_planning::Cell;
use serde::{Deserialize, Serialize};

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskDirection {
    Pickup,
    Dropoff,
}

/// Routes fulfillment side effects back to the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Sort,
    Order,
    Generic,
}

/// One pickup or dropoff against the storage entity at `target`.
///
/// A pickup usually owns its dropoff as `follow_up`; the robot that takes the
/// pickup runs the dropoff next without going back through dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub target: Cell,
    pub item: String,
    pub quantity: Quantity,
    pub direction: TaskDirection,
    pub kind: TaskKind,
    pub order_id: Option<OrderId>,
    pub follow_up: Option<Box<Task>>,
}

impl Task {
    pub fn new(id: TaskId, target: Cell, item: &str, quantity: Quantity, direction: TaskDirection, kind: TaskKind) -> Self {
        Self {
            id,
            target,
            item: item.to_string(),
            quantity,
            direction,
            kind,
            order_id: None,
            follow_up: None,
        }
    }

    pub fn pickup(id: TaskId, target: Cell, item: &str, quantity: Quantity, kind: TaskKind) -> Self {
        Self::new(id, target, item, quantity, TaskDirection::Pickup, kind)
    }

    pub fn dropoff(id: TaskId, target: Cell, item: &str, quantity: Quantity, kind: TaskKind) -> Self {
        Self::new(id, target, item, quantity, TaskDirection::Dropoff, kind)
    }

    pub fn with_follow_up(mut self, follow_up: Task) -> Self {
        self.follow_up = Some(Box::new(follow_up));
        self
    }

    pub fn for_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        if let Some(next) = self.follow_up.as_mut() {
            next.order_id = Some(order_id);
        }
        self
    }

    pub fn is_pickup(&self) -> bool {
        self.direction == TaskDirection::Pickup
    }

    /// Sets the quantity of this step and every chained step.
    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        if let Some(next) = self.follow_up.as_mut() {
            next.set_quantity(quantity);
        }
    }

    /// Final cell of the chain (the dropoff destination for a transfer).
    pub fn destination(&self) -> Cell {
        match &self.follow_up {
            Some(next) => next.destination(),
            None => self.target,
        }
    }

    /// Detaches the follow-up so it can be handed to the executing robot.
    pub fn take_follow_up(&mut self) -> Option<Task> {
        self.follow_up.take().map(|next| *next)
    }
}
