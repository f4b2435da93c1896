//! HTTP request handlers organized by domain

pub mod extract;
pub mod health;
pub mod transactions;

// Re-export all handlers for use in router
pub use extract::*;
pub use health::*;
pub use transactions::*;
