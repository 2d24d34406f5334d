//! API module
//!
//! Contains HTTP request handlers for order intake and health checks

pub mod health;
pub mod orders;

pub use health::health_check;
pub use orders::submit_order;
