pub mod agent;
pub mod route;

pub use agent::*;
pub use route::*;
