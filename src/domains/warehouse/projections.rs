use super::events::WarehouseEvent;
use crate::domains::inventory::{OrderId, Quantity, StorageKind, Task};
use crate::domains::path_planning::Cell;
use crate::domains::robot::{RobotId, RobotRole, RobotState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running counters folded from warehouse events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarehouseStats {
    pub robots: usize,
    pub moves: u64,
    pub yields: u64,
    pub tasks_queued: u64,
    pub tasks_fulfilled: u64,
    pub tasks_failed: u64,
    pub tasks_abandoned: u64,
    pub orders_queued: u64,
    pub orders_completed: u64,
    pub auto_ship_orders: u64,
    pub units_received: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

impl WarehouseStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_event(&mut self, event: &WarehouseEvent) {
        match event {
            WarehouseEvent::RobotAdded { timestamp, .. } => {
                self.robots += 1;
                self.last_activity = Some(*timestamp);
            }
            WarehouseEvent::ShipmentReceived { quantity, timestamp, .. } => {
                self.units_received += *quantity as u64;
                self.last_activity = Some(*timestamp);
            }
            WarehouseEvent::TaskQueued { timestamp, .. } => {
                self.tasks_queued += 1;
                self.last_activity = Some(*timestamp);
            }
            WarehouseEvent::RobotMoved { timestamp, .. } => {
                self.moves += 1;
                self.last_activity = Some(*timestamp);
            }
            WarehouseEvent::RobotYielded { timestamp, .. } => {
                self.yields += 1;
                self.last_activity = Some(*timestamp);
            }
            WarehouseEvent::TaskFulfilled { applied, timestamp, .. } => {
                if *applied {
                    self.tasks_fulfilled += 1;
                } else {
                    self.tasks_failed += 1;
                }
                self.last_activity = Some(*timestamp);
            }
            WarehouseEvent::TaskAbandoned { timestamp, .. } => {
                self.tasks_abandoned += 1;
                self.last_activity = Some(*timestamp);
            }
            WarehouseEvent::OrderQueued { auto_generated, timestamp, .. } => {
                self.orders_queued += 1;
                if *auto_generated {
                    self.auto_ship_orders += 1;
                }
                self.last_activity = Some(*timestamp);
            }
            WarehouseEvent::OrderCompleted { timestamp, .. } => {
                self.orders_completed += 1;
                self.last_activity = Some(*timestamp);
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotView {
    pub id: RobotId,
    pub name: String,
    pub role: RobotRole,
    pub position: Cell,
    pub state: RobotState,
    pub path: Vec<Cell>,
    pub task: Option<Task>,
    pub inventory: BTreeMap<String, Quantity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageView {
    pub position: Cell,
    pub kind: StorageKind,
    pub items: BTreeMap<String, Quantity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub description: String,
    pub remaining: BTreeMap<String, Quantity>,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseSnapshot {
    pub warehouse_id: String,
    pub tick: u64,
    pub rows: usize,
    pub cols: usize,
    pub robots: Vec<RobotView>,
    pub storage: Vec<StorageView>,
    pub shipping_stations: Vec<Cell>,
    pub receiving_stations: Vec<Cell>,
    pub orders: Vec<OrderView>,
    pub sort_queue_depth: usize,
    pub order_queue_depth: usize,
}
