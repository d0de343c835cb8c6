pub mod adapters;
pub mod application;
pub mod common;
pub mod config;
pub mod domains;

pub use config::Config;

// Re-export common types
pub use common::{
    AggregateRoot, ApplicationError, ApplicationResult, DomainError, DomainEvent, DomainResult, EventEnvelope,
    EventMetadata, Snapshot,
};

// Re-export domain modules
pub use domains::{inventory, logger, path_planning, robot, warehouse};
