use super::ledger::Quantity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type OrderId = u64;

/// Customer demand tracked until every line is delivered to the shipping station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    line_items: BTreeMap<String, Quantity>,
    remaining: BTreeMap<String, Quantity>,
    pub auto_generated: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Non-positive lines are dropped and duplicate items merged.
    pub fn new<I, S>(id: OrderId, lines: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let line_items = normalize_lines(lines).into_iter().collect::<BTreeMap<_, _>>();
        Self {
            id,
            remaining: line_items.clone(),
            line_items,
            auto_generated: false,
            created_at: Utc::now(),
        }
    }

    pub fn line_items(&self) -> &BTreeMap<String, Quantity> {
        &self.line_items
    }

    pub fn remaining_lines(&self) -> &BTreeMap<String, Quantity> {
        &self.remaining
    }

    pub fn remaining(&self, item: &str) -> Quantity {
        self.remaining.get(item).copied().unwrap_or(0)
    }

    pub fn total_units(&self) -> u64 {
        self.line_items.values().map(|q| *q as u64).sum()
    }

    /// Counts down the remaining quantity for `item`, saturating at zero.
    pub fn register_fulfillment(&mut self, item: &str, quantity: Quantity) {
        if let Some(left) = self.remaining.get_mut(item) {
            *left = left.saturating_sub(quantity);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.remaining.values().all(|q| *q == 0)
    }

    pub fn needs(&self, item: &str) -> bool {
        self.remaining(item) > 0
    }

    pub fn describe(&self) -> String {
        self.line_items
            .iter()
            .map(|(item, quantity)| format!("{}x {}", quantity, item))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Drops non-positive quantities and merges duplicates, keeping first-seen order.
pub fn normalize_lines<I, S>(lines: I) -> Vec<(String, Quantity)>
where
    I: IntoIterator<Item = (S, i64)>,
    S: AsRef<str>,
{
    let mut merged: Vec<(String, Quantity)> = Vec::new();
    for (item, quantity) in lines {
        if quantity <= 0 {
            continue;
        }
        let quantity = Quantity::try_from(quantity).unwrap_or(Quantity::MAX);
        let item = item.as_ref();
        match merged.iter_mut().find(|(name, _)| name == item) {
            Some((_, total)) => *total = total.saturating_add(quantity),
            None => merged.push((item.to_string(), quantity)),
        }
    }
    merged
}
