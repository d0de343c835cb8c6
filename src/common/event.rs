use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub trait DomainEvent: Send + Sync + Clone {
    fn event_type(&self) -> &'static str;
    fn aggregate_id(&self) -> &str;
    fn event_version(&self) -> u64;
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Serialized form of a domain event handed to consumers outside the core
/// (renderers, log shippers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub event_type: String,
    pub event_version: u64,
    pub event_data: serde_json::Value,
    pub metadata: EventMetadata,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub correlation_id: Option<Uuid>,
    pub tick: Option<u64>,
    pub source: String,
}

impl EventMetadata {
    pub fn from_source(source: &str) -> Self {
        Self {
            correlation_id: None,
            tick: None,
            source: source.to_string(),
        }
    }

    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }
}

impl EventEnvelope {
    pub fn new<E: DomainEvent + Serialize>(
        event: &E,
        aggregate_type: &str,
        metadata: EventMetadata,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id: Uuid::new_v4(),
            aggregate_id: event.aggregate_id().to_string(),
            aggregate_type: aggregate_type.to_string(),
            event_type: event.event_type().to_string(),
            event_version: event.event_version(),
            event_data: serde_json::to_value(event)?,
            metadata,
            occurred_at: event.occurred_at(),
        })
    }
}
