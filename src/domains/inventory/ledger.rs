use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Quantity = u32;

/// Item-name to quantity ledger. Zero entries are removed, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: BTreeMap<String, Quantity>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: &str, quantity: Quantity) {
        if quantity == 0 {
            return;
        }
        *self.items.entry(item.to_string()).or_insert(0) += quantity;
    }

    /// Removes exactly `quantity`; leaves the ledger untouched and returns
    /// `false` when less is available.
    pub fn remove(&mut self, item: &str, quantity: Quantity) -> bool {
        let Some(current) = self.items.get_mut(item) else {
            return quantity == 0;
        };
        if *current < quantity {
            return false;
        }
        *current -= quantity;
        if *current == 0 {
            self.items.remove(item);
        }
        true
    }

    /// Removes up to `quantity` and returns how much was taken.
    pub fn remove_up_to(&mut self, item: &str, quantity: Quantity) -> Quantity {
        let taken = self.quantity(item).min(quantity);
        self.remove(item, taken);
        taken
    }

    pub fn quantity(&self, item: &str) -> Quantity {
        self.items.get(item).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.items.values().map(|q| *q as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Quantity)> {
        self.items.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn to_map(&self) -> BTreeMap<String, Quantity> {
        self.items.clone()
    }
}
