use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Point-in-time read model of an aggregate, serialized for the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: Uuid,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub aggregate_version: u64,
    pub snapshot_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new<T: Serialize>(
        aggregate_id: &str,
        aggregate_type: &str,
        aggregate_version: u64,
        aggregate_data: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            snapshot_id: Uuid::new_v4(),
            aggregate_id: aggregate_id.to_string(),
            aggregate_type: aggregate_type.to_string(),
            aggregate_version,
            snapshot_data: serde_json::to_value(aggregate_data)?,
            created_at: Utc::now(),
        })
    }

    pub fn restore<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.snapshot_data.clone())
    }
}
