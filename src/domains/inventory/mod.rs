pub mod ledger;
pub mod order;
pub mod storage;
pub mod task;

pub use ledger::*;
pub use order::*;
pub use storage::*;
pub use task::*;
