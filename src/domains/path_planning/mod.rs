pub mod arbitration;
pub mod forecast;
pub mod grid;
pub mod pathfinder;
pub mod types;

pub use arbitration::*;
pub use forecast::*;
pub use grid::*;
pub use pathfinder::*;
pub use types::*;
