pub mod bootstrap;
pub mod importer;
pub mod simulation_service;

pub use bootstrap::*;
pub use importer::*;
pub use simulation_service::*;
