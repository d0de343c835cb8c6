pub mod inventory;
pub mod logger;
pub mod path_planning;
pub mod robot;
pub mod warehouse;

pub use inventory::*;
pub use logger::*;
pub use path_planning::*;
pub use robot::*;
pub use warehouse::*;
