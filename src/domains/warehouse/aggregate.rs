use super::events::WarehouseEvent;
use super::projections::{OrderView, RobotView, StorageView, WarehouseSnapshot};
use super::settings::WarehouseSettings;
use crate::common::{AggregateRoot, DomainError, DomainResult};
use crate::domains::inventory::{Order, OrderId, StorageEntity, StorageKind, Task, TaskId};
use crate::domains::logger::DynLogger;
use crate::domains::path_planning::{Cell, GridMap, Pathfinder};
use crate::domains::robot::{Robot, RobotId, RobotRole};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap, VecDeque};
use uuid::Uuid;

/// The orchestrator: owns the grid, every storage entity, the robots, live
/// orders and the two dispatch queues, and runs the per-tick update.
pub struct Warehouse {
    pub(super) id: String,
    pub(super) grid: GridMap,
    pub(super) pathfinder: Pathfinder,
    pub(super) settings: WarehouseSettings,
    pub(super) storage: BTreeMap<Cell, StorageEntity>,
    pub(super) shipping_stations: Vec<Cell>,
    pub(super) receiving_stations: Vec<Cell>,
    pub(super) item_homes: BTreeMap<String, Cell>,
    pub(super) robots: Vec<Robot>,
    pub(super) orders: BTreeMap<OrderId, Order>,
    pub(super) order_shipping: HashMap<OrderId, Cell>,
    pub(super) next_order_id: OrderId,
    pub(super) next_task_id: TaskId,
    pub(super) sort_queue: VecDeque<Task>,
    pub(super) order_queue: VecDeque<Task>,
    /// In-flight receiving-to-home transfers, keyed by (station cell, item).
    pub(super) receiving_transfers: HashMap<(Cell, String), TaskId>,
    pub(super) rng: StdRng,
    pub(super) tick: u64,
    pub(super) version: u64,
    pub(super) logger: DynLogger,
    uncommitted_events: Vec<WarehouseEvent>,
}

impl Warehouse {
    /// Every blocked cell of `grid` becomes an empty shelf.
    pub fn new(grid: GridMap, settings: WarehouseSettings, logger: DynLogger) -> Self {
        let storage = grid
            .blocked_cells()
            .into_iter()
            .map(|cell| (cell, StorageEntity::shelf(cell)))
            .collect();
        Self {
            id: Uuid::new_v4().to_string(),
            pathfinder: Pathfinder::new(settings.max_time_depth),
            rng: StdRng::seed_from_u64(settings.rng_seed),
            grid,
            settings,
            storage,
            shipping_stations: Vec::new(),
            receiving_stations: Vec::new(),
            item_homes: BTreeMap::new(),
            robots: Vec::new(),
            orders: BTreeMap::new(),
            order_shipping: HashMap::new(),
            next_order_id: 1,
            next_task_id: 1,
            sort_queue: VecDeque::new(),
            order_queue: VecDeque::new(),
            receiving_transfers: HashMap::new(),
            tick: 0,
            version: 0,
            logger,
            uncommitted_events: Vec::new(),
        }
    }

    /// Places a receiving or shipping station on a free walkable cell.
    pub fn add_station(&mut self, cell: Cell, kind: StorageKind) -> DomainResult<()> {
        if !kind.is_station() {
            return Err(DomainError::InvalidCommand {
                reason: "shelves come from the layout, not from add_station".to_string(),
            });
        }
        if !self.grid.in_bounds(cell) {
            return Err(DomainError::OutOfBounds { cell });
        }
        if self.storage.contains_key(&cell) || !self.grid.is_walkable(cell) {
            return Err(DomainError::CellOccupied { cell });
        }
        self.storage.insert(cell, StorageEntity::new(cell, kind));
        match kind {
            StorageKind::ShippingStation => self.shipping_stations.push(cell),
            _ => self.receiving_stations.push(cell),
        }
        Ok(())
    }

    pub fn set_item_home(&mut self, item: &str, cell: Cell) -> DomainResult<()> {
        match self.storage.get(&cell) {
            Some(entity) if entity.kind == StorageKind::Shelf => {
                self.item_homes.insert(item.to_string(), cell);
                Ok(())
            }
            Some(_) => Err(DomainError::InvalidCommand {
                reason: format!("home of {} must be a shelf, {} is a station", item, cell),
            }),
            None => Err(DomainError::UnknownStorage { cell }),
        }
    }

    pub fn add_robot(&mut self, cell: Cell, role: RobotRole) -> DomainResult<RobotId> {
        if !self.grid.in_bounds(cell) {
            return Err(DomainError::OutOfBounds { cell });
        }
        if !self.grid.is_walkable(cell) || self.robot_at(cell).is_some() {
            return Err(DomainError::CellOccupied { cell });
        }
        let robot_id = self.robots.len() as RobotId;
        let robot = Robot::new(robot_id, role, cell);
        self.logger.info(&format!("Added {} at {}", robot.name, cell));
        self.robots.push(robot);
        self.record(WarehouseEvent::RobotAdded {
            warehouse_id: self.id.clone(),
            robot_id,
            role,
            position: cell,
            timestamp: Utc::now(),
        });
        self.assign_tasks();
        Ok(robot_id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn settings(&self) -> &WarehouseSettings {
        &self.settings
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.iter().find(|r| r.id == id)
    }

    pub fn robot_at(&self, cell: Cell) -> Option<&Robot> {
        self.robots.iter().find(|r| r.position() == cell)
    }

    pub(super) fn robot_index(&self, id: RobotId) -> Option<usize> {
        self.robots.iter().position(|r| r.id == id)
    }

    pub fn storage_at(&self, cell: Cell) -> Option<&StorageEntity> {
        self.storage.get(&cell)
    }

    pub fn storage(&self) -> impl Iterator<Item = &StorageEntity> {
        self.storage.values()
    }

    pub fn shipping_stations(&self) -> &[Cell] {
        &self.shipping_stations
    }

    pub fn receiving_stations(&self) -> &[Cell] {
        &self.receiving_stations
    }

    pub fn item_home(&self, item: &str) -> Option<Cell> {
        self.item_homes.get(item).copied()
    }

    pub fn item_homes(&self) -> &BTreeMap<String, Cell> {
        &self.item_homes
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// "Order #1: 2x Widget, 1x Gadget" for every live order.
    pub fn live_order_descriptions(&self) -> Vec<String> {
        self.orders
            .values()
            .map(|o| format!("Order #{}: {}", o.id, o.describe()))
            .collect()
    }

    pub fn sort_queue(&self) -> &VecDeque<Task> {
        &self.sort_queue
    }

    pub fn order_queue(&self) -> &VecDeque<Task> {
        &self.order_queue
    }

    /// Units of `item` held by storage entities and robots together.
    pub fn units_in_system(&self, item: &str) -> u64 {
        let stored: u64 = self.storage.values().map(|s| s.quantity(item) as u64).sum();
        let carried: u64 = self.robots.iter().map(|r| r.inventory().quantity(item) as u64).sum();
        stored + carried
    }

    pub fn snapshot(&self) -> WarehouseSnapshot {
        WarehouseSnapshot {
            warehouse_id: self.id.clone(),
            tick: self.tick,
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            robots: self
                .robots
                .iter()
                .map(|r| RobotView {
                    id: r.id,
                    name: r.name.clone(),
                    role: r.role,
                    position: r.position(),
                    state: r.state(),
                    path: r.path().iter().copied().collect(),
                    task: r.current_task().cloned(),
                    inventory: r.inventory().to_map(),
                })
                .collect(),
            storage: self
                .storage
                .values()
                .map(|s| StorageView {
                    position: s.position,
                    kind: s.kind,
                    items: s.items().to_map(),
                })
                .collect(),
            shipping_stations: self.shipping_stations.clone(),
            receiving_stations: self.receiving_stations.clone(),
            orders: self
                .orders
                .values()
                .map(|o| OrderView {
                    id: o.id,
                    description: o.describe(),
                    remaining: o.remaining_lines().clone(),
                })
                .collect(),
            sort_queue_depth: self.sort_queue.len(),
            order_queue_depth: self.order_queue.len(),
        }
    }

    pub(super) fn next_task_id(&mut self) -> TaskId {
        let id = self.next_task_id;
        self.next_task_id += 1;
        id
    }

    pub(super) fn record(&mut self, event: WarehouseEvent) {
        self.add_event(event);
    }
}

impl AggregateRoot for Warehouse {
    type Event = WarehouseEvent;

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
        self.version += 1;
    }
}
