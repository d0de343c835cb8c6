use crate::common::DomainEvent;
use crate::domains::inventory::{OrderId, Quantity, TaskDirection, TaskId, TaskKind};
use crate::domains::path_planning::{Cell, YieldReason};
use crate::domains::robot::{RobotId, RobotRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WarehouseEvent {
    RobotAdded {
        warehouse_id: String,
        robot_id: RobotId,
        role: RobotRole,
        position: Cell,
        timestamp: DateTime<Utc>,
    },
    StockAdded {
        warehouse_id: String,
        cell: Cell,
        item: String,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },
    ShipmentReceived {
        warehouse_id: String,
        station: Option<Cell>,
        item: String,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },
    TaskQueued {
        warehouse_id: String,
        task_id: TaskId,
        kind: TaskKind,
        item: String,
        quantity: Quantity,
        source: Cell,
        destination: Cell,
        timestamp: DateTime<Utc>,
    },
    TaskAssigned {
        warehouse_id: String,
        task_id: TaskId,
        robot_id: RobotId,
        timestamp: DateTime<Utc>,
    },
    RobotMoved {
        warehouse_id: String,
        robot_id: RobotId,
        from: Cell,
        to: Cell,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    RobotYielded {
        warehouse_id: String,
        robot_id: RobotId,
        reason: YieldReason,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    TaskFulfilled {
        warehouse_id: String,
        task_id: TaskId,
        robot_id: RobotId,
        direction: TaskDirection,
        kind: TaskKind,
        item: String,
        quantity: Quantity,
        applied: bool,
        timestamp: DateTime<Utc>,
    },
    TaskAbandoned {
        warehouse_id: String,
        task_id: TaskId,
        robot_id: RobotId,
        reason: String,
        requeued: bool,
        timestamp: DateTime<Utc>,
    },
    OrderQueued {
        warehouse_id: String,
        order_id: OrderId,
        description: String,
        auto_generated: bool,
        timestamp: DateTime<Utc>,
    },
    OrderCompleted {
        warehouse_id: String,
        order_id: OrderId,
        shipping_station: Option<Cell>,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for WarehouseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WarehouseEvent::RobotAdded { .. } => "RobotAdded",
            WarehouseEvent::StockAdded { .. } => "StockAdded",
            WarehouseEvent::ShipmentReceived { .. } => "ShipmentReceived",
            WarehouseEvent::TaskQueued { .. } => "TaskQueued",
            WarehouseEvent::TaskAssigned { .. } => "TaskAssigned",
            WarehouseEvent::RobotMoved { .. } => "RobotMoved",
            WarehouseEvent::RobotYielded { .. } => "RobotYielded",
            WarehouseEvent::TaskFulfilled { .. } => "TaskFulfilled",
            WarehouseEvent::TaskAbandoned { .. } => "TaskAbandoned",
            WarehouseEvent::OrderQueued { .. } => "OrderQueued",
            WarehouseEvent::OrderCompleted { .. } => "OrderCompleted",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            WarehouseEvent::RobotAdded { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::StockAdded { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::ShipmentReceived { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::TaskQueued { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::TaskAssigned { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::RobotMoved { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::RobotYielded { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::TaskFulfilled { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::TaskAbandoned { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::OrderQueued { warehouse_id, .. } => warehouse_id,
            WarehouseEvent::OrderCompleted { warehouse_id, .. } => warehouse_id,
        }
    }

    fn event_version(&self) -> u64 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            WarehouseEvent::RobotAdded { timestamp, .. } => *timestamp,
            WarehouseEvent::StockAdded { timestamp, .. } => *timestamp,
            WarehouseEvent::ShipmentReceived { timestamp, .. } => *timestamp,
            WarehouseEvent::TaskQueued { timestamp, .. } => *timestamp,
            WarehouseEvent::TaskAssigned { timestamp, .. } => *timestamp,
            WarehouseEvent::RobotMoved { timestamp, .. } => *timestamp,
            WarehouseEvent::RobotYielded { timestamp, .. } => *timestamp,
            WarehouseEvent::TaskFulfilled { timestamp, .. } => *timestamp,
            WarehouseEvent::TaskAbandoned { timestamp, .. } => *timestamp,
            WarehouseEvent::OrderQueued { timestamp, .. } => *timestamp,
            WarehouseEvent::OrderCompleted { timestamp, .. } => *timestamp,
        }
    }
}
