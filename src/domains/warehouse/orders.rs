use super::aggregate::Warehouse;
use super::events::WarehouseEvent;
use crate::common::{DomainError, DomainResult};
use crate::domains::inventory::{normalize_lines, Order, OrderId, Quantity, StorageKind, Task, TaskKind};
use crate::domains::path_planning::Cell;
use chrono::Utc;

impl Warehouse {
    /// Accepts a customer order and queues one pickup/dropoff pair per line
    /// that can be sourced. Lines are capped at what the source shelf holds.
    pub fn create_order<I, S>(&mut self, lines: I) -> DomainResult<OrderId>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let order_id = self.queue_order(normalize_lines(lines), false)?;
        self.assign_tasks();
        Ok(order_id)
    }

    pub(super) fn queue_order(&mut self, lines: Vec<(String, Quantity)>, auto_generated: bool) -> DomainResult<OrderId> {
        if lines.is_empty() {
            self.logger.warn("Invalid order request");
            return Err(DomainError::InvalidCommand {
                reason: "order has no line with a positive quantity".to_string(),
            });
        }
        let Some(station) = self.select_station(StorageKind::ShippingStation) else {
            self.logger.warn("No shipping station configured");
            return Err(DomainError::NoStation {
                kind: StorageKind::ShippingStation.to_string(),
            });
        };

        let mut prepared: Vec<(String, Quantity, Cell)> = Vec::new();
        for (item, requested) in lines {
            let Some(source) = self.find_source_shelf(&item) else {
                self.logger.warn(&format!("Item {} unavailable for order", item));
                continue;
            };
            let available = self.storage.get(&source).map(|s| s.quantity(&item)).unwrap_or(0);
            let quantity = requested.min(available);
            if quantity == 0 {
                self.logger.warn(&format!("Item {} out of stock", item));
                continue;
            }
            prepared.push((item, quantity, source));
        }
        if prepared.is_empty() {
            self.logger.warn("Order could not be queued; no items available");
            return Err(DomainError::Unfulfillable {
                reason: "none of the requested items is in stock".to_string(),
            });
        }

        let order_id = self.next_order_id;
        self.next_order_id += 1;
        let mut order = Order::new(order_id, prepared.iter().map(|(item, q, _)| (item.as_str(), *q as i64)));
        order.auto_generated = auto_generated;
        let description = order.describe();
        self.logger.info(&format!("Queued order #{} for {}", order_id, description));
        self.orders.insert(order_id, order);
        self.order_shipping.insert(order_id, station);

        for (item, quantity, source) in prepared {
            let pickup_id = self.next_task_id();
            let dropoff_id = self.next_task_id();
            let dropoff = Task::dropoff(dropoff_id, station, &item, quantity, TaskKind::Order);
            let pickup = Task::pickup(pickup_id, source, &item, quantity, TaskKind::Order)
                .with_follow_up(dropoff)
                .for_order(order_id);
            self.record_task_queued(&pickup);
            self.order_queue.push_back(pickup);
        }

        self.record(WarehouseEvent::OrderQueued {
            warehouse_id: self.id.clone(),
            order_id,
            description,
            auto_generated,
            timestamp: Utc::now(),
        });
        Ok(order_id)
    }

    /// The item's home shelf if it has stock, else the first shelf that does.
    fn find_source_shelf(&self, item: &str) -> Option<Cell> {
        if let Some(home) = self.item_home(item) {
            if self.storage.get(&home).map(|s| s.quantity(item) > 0).unwrap_or(false) {
                return Some(home);
            }
        }
        self.storage
            .values()
            .find(|s| s.kind == StorageKind::Shelf && s.quantity(item) > 0)
            .map(|s| s.position)
    }

    /// Counts a delivered line against its order. A completed order is
    /// cleared from its shipping station and removed.
    pub fn record_order_fulfillment(&mut self, order_id: OrderId, item: &str, quantity: Quantity) {
        let Some(order) = self.orders.get_mut(&order_id) else {
            return;
        };
        order.register_fulfillment(item, quantity);
        if !order.is_complete() {
            return;
        }

        let Some(order) = self.orders.remove(&order_id) else {
            return;
        };
        let station = self.order_shipping.remove(&order_id);
        if let Some(shelf) = station.and_then(|cell| self.storage.get_mut(&cell)) {
            for (line_item, line_quantity) in order.line_items() {
                shelf.items_mut().remove_up_to(line_item, *line_quantity);
            }
        }
        self.logger.info(&format!("Order #{} packed and cleared from order shelf", order_id));
        self.record(WarehouseEvent::OrderCompleted {
            warehouse_id: self.id.clone(),
            order_id,
            shipping_station: station,
            timestamp: Utc::now(),
        });
    }

    /// Restocked items nobody is waiting for are shipped straight back out,
    /// capped at what the shelf now holds.
    pub(super) fn auto_ship(&mut self, item: &str, shelf: Cell, quantity: Quantity) {
        if !self.settings.auto_ship_on_restock || self.orders.values().any(|o| o.needs(item)) {
            return;
        }
        let available = self.storage.get(&shelf).map(|s| s.quantity(item)).unwrap_or(0);
        let quantity = quantity.min(available);
        if quantity == 0 {
            return;
        }
        if let Err(err) = self.queue_order(vec![(item.to_string(), quantity)], true) {
            self.logger.warn(&format!("Auto-ship of {} skipped: {}", item, err));
        }
    }
}
