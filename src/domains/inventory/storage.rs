use super::ledger::{Inventory, Quantity};
use crate::domains::path_planning::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Shelf,
    /// Inbound boundary: shipments arrive here.
    ReceivingStation,
    /// Outbound boundary: orders are packed here.
    ShippingStation,
}

impl StorageKind {
    pub fn is_station(&self) -> bool {
        !matches!(self, StorageKind::Shelf)
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StorageKind::Shelf => "shelf",
            StorageKind::ReceivingStation => "receiving",
            StorageKind::ShippingStation => "shipping",
        };
        f.write_str(label)
    }
}

/// A shelf or station: a quantity ledger anchored to one grid cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEntity {
    pub position: Cell,
    pub kind: StorageKind,
    items: Inventory,
}

impl StorageEntity {
    pub fn new(position: Cell, kind: StorageKind) -> Self {
        Self {
            position,
            kind,
            items: Inventory::new(),
        }
    }

    pub fn shelf(position: Cell) -> Self {
        Self::new(position, StorageKind::Shelf)
    }

    pub fn add_item(&mut self, item: &str, quantity: Quantity) {
        self.items.add(item, quantity);
    }

    pub fn remove_item(&mut self, item: &str, quantity: Quantity) -> bool {
        self.items.remove(item, quantity)
    }

    pub fn quantity(&self, item: &str) -> Quantity {
        self.items.quantity(item)
    }

    /// Sum of all quantities; used to pick the least busy station.
    pub fn load(&self) -> u64 {
        self.items.total()
    }

    pub fn items(&self) -> &Inventory {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Inventory {
        &mut self.items
    }
}
