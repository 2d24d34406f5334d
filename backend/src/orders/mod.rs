//! Order intake domain
//!
//! The order payload wrapper, its validation, and the text rendered from it.

pub mod model;
pub mod summary;

pub use model::{Order, OrderLine, OrderValidationError};
pub use summary::{render_summary, MessageTemplates, SummaryError};
