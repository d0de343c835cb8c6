use crate::common::DomainEvent;
use serde::{Deserialize, Serialize};

/// Aggregates record every state change as an event. Consumers drain the
/// uncommitted buffer once per tick.
pub trait AggregateRoot {
    type Event: DomainEvent + Serialize + for<'de> Deserialize<'de>;

    fn aggregate_id(&self) -> &str;
    fn version(&self) -> u64;

    /// Get uncommitted events
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Mark events as committed
    fn mark_events_as_committed(&mut self);

    /// Add a new event to the uncommitted events list
    fn add_event(&mut self, event: Self::Event);

    /// Drain uncommitted events, committing them.
    fn take_events(&mut self) -> Vec<Self::Event> {
        let events = self.uncommitted_events().to_vec();
        self.mark_events_as_committed();
        events
    }
}
