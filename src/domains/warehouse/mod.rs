pub mod aggregate;
pub mod dispatch;
pub mod events;
pub mod navigation;
pub mod orders;
pub mod projections;
pub mod settings;
pub mod stocking;
pub mod tick;

pub use aggregate::*;
pub use events::*;
pub use navigation::*;
pub use projections::*;
pub use settings::*;
pub use stocking::*;
