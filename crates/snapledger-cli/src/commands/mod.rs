//! Command implementations

mod core;
mod extract;
mod serve;
mod transactions;

pub use core::*;
pub use extract::*;
pub use serve::*;
pub use transactions::*;
