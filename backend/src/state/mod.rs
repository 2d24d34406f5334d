// State management module
// Handles shared application state and order persistence

pub mod app_state;
pub mod persistence;

pub use app_state::{AppState, SharedState};
pub use persistence::{OrderStore, PersistenceError};
