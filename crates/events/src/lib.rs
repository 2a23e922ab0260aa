//! # CTA Events
//!
//! The notifications emitted by the background backtester service: log lines and
//! task-completion signals. Callers receive them on a channel and may forward them
//! to any front-end as JSON.
//!
//! This crate depends on no other workspace crate.

// Declare the modules that make up this crate.
pub mod error;
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use messages::{BacktesterEvent, LogLevel, LogMessage};
