use super::aggregate::Warehouse;
use super::events::WarehouseEvent;
use crate::common::{DomainError, DomainResult};
use crate::domains::inventory::{Quantity, StorageKind, Task, TaskId, TaskKind};
use crate::domains::path_planning::Cell;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Where an incoming shipment ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentReceipt {
    /// Placed on a receiving station; a sort transfer is queued or was raised.
    Received { station: Cell },
    /// No receiving station exists, so the item went straight to its home shelf.
    StockedDirectly { shelf: Cell },
    /// Too many sort batches pending; nothing was stored.
    Throttled,
    /// Zero quantity or an item with no home; nothing was stored.
    Rejected,
}

impl ShipmentReceipt {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ShipmentReceipt::Received { .. } | ShipmentReceipt::StockedDirectly { .. })
    }
}

impl Warehouse {
    /// Adds stock to the entity at `cell`. Stock placed on a shelf other than
    /// the item's home queues a sort transfer to the home shelf.
    pub fn stock_shelf(&mut self, cell: Cell, item: &str, quantity: Quantity) -> DomainResult<()> {
        let entity = self
            .storage
            .get_mut(&cell)
            .ok_or(DomainError::UnknownStorage { cell })?;
        if quantity == 0 {
            return Ok(());
        }
        entity.add_item(item, quantity);
        let kind = entity.kind;
        self.record(WarehouseEvent::StockAdded {
            warehouse_id: self.id.clone(),
            cell,
            item: item.to_string(),
            quantity,
            timestamp: Utc::now(),
        });

        if kind.is_station() {
            return Ok(());
        }
        if let Some(home) = self.item_home(item).filter(|home| *home != cell) {
            if self.storage.contains_key(&home) {
                self.queue_transfer(cell, home, item, quantity);
                self.assign_tasks();
            }
        }
        Ok(())
    }

    /// Accepts an inbound shipment at the least loaded receiving station.
    pub fn receive_shipment(&mut self, item: &str, quantity: Quantity) -> ShipmentReceipt {
        if quantity == 0 || !self.is_relevant_item(item) {
            self.logger.warn(&format!("Rejected shipment of {}x {}", quantity, item));
            return ShipmentReceipt::Rejected;
        }

        let Some(station) = self.select_station(StorageKind::ReceivingStation) else {
            self.logger.warn("No receiving station configured; stocking directly");
            let Some(home) = self.item_home(item) else {
                return ShipmentReceipt::Rejected;
            };
            return match self.stock_shelf(home, item, quantity) {
                Ok(()) => {
                    self.record_shipment(None, item, quantity);
                    ShipmentReceipt::StockedDirectly { shelf: home }
                }
                Err(err) => {
                    self.logger.error(&format!("Direct stocking of {} failed: {}", item, err));
                    ShipmentReceipt::Rejected
                }
            };
        };

        let merges = self.receiving_transfers.contains_key(&(station, item.to_string()));
        if !merges && !self.can_accept_sorter_batch() {
            self.logger.debug(&format!("Throttled shipment of {}x {}", quantity, item));
            return ShipmentReceipt::Throttled;
        }

        if let Some(entity) = self.storage.get_mut(&station) {
            entity.add_item(item, quantity);
        }
        self.record_shipment(Some(station), item, quantity);
        self.logger.info(&format!("Received {}x {} at {}", quantity, item, station));
        self.queue_receiving_transfer(station, item);
        self.assign_tasks();
        ShipmentReceipt::Received { station }
    }

    /// True while queued plus in-flight sort batches stay under the ceiling.
    pub fn can_accept_sorter_batch(&self) -> bool {
        let ceiling = self.settings.sorter_max_pending_batches;
        if ceiling == 0 {
            return true;
        }
        let active = self
            .robots
            .iter()
            .filter(|r| r.current_task().map(|t| t.kind == TaskKind::Sort).unwrap_or(false))
            .count();
        self.sort_queue.len() + active < ceiling
    }

    /// Items with a home shelf are the ones this warehouse stocks.
    pub fn is_relevant_item(&self, item: &str) -> bool {
        self.item_homes.contains_key(item)
    }

    /// Lowest-loaded station of `kind`; ties go to the first configured.
    pub(super) fn select_station(&self, kind: StorageKind) -> Option<Cell> {
        let stations = match kind {
            StorageKind::ShippingStation => &self.shipping_stations,
            StorageKind::ReceivingStation => &self.receiving_stations,
            StorageKind::Shelf => return None,
        };
        stations
            .iter()
            .filter_map(|cell| self.storage.get(cell))
            .min_by_key(|s| s.load())
            .map(|s| s.position)
    }

    /// One transfer per (station, item): an existing one is raised to the
    /// station's current total instead of being duplicated.
    fn queue_receiving_transfer(&mut self, station: Cell, item: &str) {
        let Some(home) = self.item_home(item).filter(|h| self.storage.contains_key(h)) else {
            return;
        };
        let total = self.storage.get(&station).map(|s| s.quantity(item)).unwrap_or(0);
        if total == 0 {
            return;
        }
        let key = (station, item.to_string());
        if let Some(task_id) = self.receiving_transfers.get(&key).copied() {
            if self.raise_transfer(task_id, total) {
                self.logger.debug(&format!("Raised transfer #{} of {} to {}", task_id, item, total));
                return;
            }
            self.receiving_transfers.remove(&key);
        }
        let task_id = self.queue_transfer(station, home, item, total);
        self.receiving_transfers.insert(key, task_id);
    }

    fn raise_transfer(&mut self, task_id: TaskId, total: Quantity) -> bool {
        if let Some(task) = self.sort_queue.iter_mut().find(|t| t.id == task_id) {
            if total > task.quantity {
                task.set_quantity(total);
            }
            return true;
        }
        self.robots.iter_mut().any(|r| r.raise_task_quantity(task_id, total))
    }

    /// Queues a sort pickup at `source` chained to a dropoff at `destination`.
    pub(super) fn queue_transfer(&mut self, source: Cell, destination: Cell, item: &str, quantity: Quantity) -> TaskId {
        let pickup_id = self.next_task_id();
        let dropoff_id = self.next_task_id();
        let dropoff = Task::dropoff(dropoff_id, destination, item, quantity, TaskKind::Sort);
        let pickup = Task::pickup(pickup_id, source, item, quantity, TaskKind::Sort).with_follow_up(dropoff);
        self.record_task_queued(&pickup);
        self.sort_queue.push_back(pickup);
        pickup_id
    }

    /// Drops the dedup entry once its pickup has run (or been given up).
    pub(super) fn release_receiving_transfer(&mut self, task: &Task) {
        if !self.receiving_stations.contains(&task.target) {
            return;
        }
        let key = (task.target, task.item.clone());
        if self.receiving_transfers.get(&key) == Some(&task.id) {
            self.receiving_transfers.remove(&key);
        }
    }

    pub(super) fn record_task_queued(&mut self, task: &Task) {
        self.record(WarehouseEvent::TaskQueued {
            warehouse_id: self.id.clone(),
            task_id: task.id,
            kind: task.kind,
            item: task.item.clone(),
            quantity: task.quantity,
            source: task.target,
            destination: task.destination(),
            timestamp: Utc::now(),
        });
    }

    fn record_shipment(&mut self, station: Option<Cell>, item: &str, quantity: Quantity) {
        self.record(WarehouseEvent::ShipmentReceived {
            warehouse_id: self.id.clone(),
            station,
            item: item.to_string(),
            quantity,
            timestamp: Utc::now(),
        });
    }
}
