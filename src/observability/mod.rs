//! # Observability
//!
//! Structured logging for store and hub lifecycle events.

mod logger;

pub use logger::{Logger, Severity};
