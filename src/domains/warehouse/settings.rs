use serde::{Deserialize, Serialize};

/// Which queues an idle robot may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Any idle robot takes the head of the sort queue, else the head of the order queue.
    #[default]
    Shared,
    /// Sorters serve only the sort queue and pickers only the order queue.
    /// Generic robots behave as under `Shared`.
    RoleGated,
}

/// Tuning knobs for dispatch and motion planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseSettings {
    pub dispatch_policy: DispatchPolicy,
    /// Ceiling on queued plus in-flight sort batches; `0` disables throttling.
    pub sorter_max_pending_batches: usize,
    /// Queue a shipping order for restocked items nobody is waiting for.
    pub auto_ship_on_restock: bool,
    pub max_time_depth: usize,
    pub approach_search_depth: usize,
    pub replan_after_blocked_ticks: u32,
    pub max_plan_retries: u32,
    pub rng_seed: u64,
}

impl Default for WarehouseSettings {
    fn default() -> Self {
        Self {
            dispatch_policy: DispatchPolicy::Shared,
            sorter_max_pending_batches: 8,
            auto_ship_on_restock: true,
            max_time_depth: 50,
            approach_search_depth: 2,
            replan_after_blocked_ticks: 2,
            max_plan_retries: 20,
            rng_seed: 7,
        }
    }
}
