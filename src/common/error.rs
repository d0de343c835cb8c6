use crate::domains::path_planning::Cell;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No storage entity at {cell}")]
    UnknownStorage { cell: Cell },

    #[error("Cell {cell} is outside the grid")]
    OutOfBounds { cell: Cell },

    #[error("Cell {cell} is already occupied")]
    CellOccupied { cell: Cell },

    #[error("Invalid layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("No {kind} station configured")]
    NoStation { kind: String },

    #[error("Request cannot be fulfilled: {reason}")]
    Unfulfillable { reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
