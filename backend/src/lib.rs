//! FreshFold Backend Library
//!
//! Order intake service for a laundry shop. This library exposes the
//! modules for testing; the binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
/// Email and SMS notifications for accepted orders
pub mod notify;
/// Order payload model and human-readable rendering
pub mod orders;
pub mod server;
/// Application state management
///
/// Handles the shared configuration, the order file and the notifier.
pub mod state;
