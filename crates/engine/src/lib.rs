//! # CTA Backtester Service
//!
//! This crate hosts backtests and optimizations behind a small service API suitable
//! for a user interface: start a task, listen for events, fetch the results.
//!
//! ## Architectural Principles
//!
//! - **One Task At A Time:** an atomic gate admits a single running task. A second
//!   request is refused with a log event rather than queued.
//! - **Background Worker:** each task runs on its own thread so the caller never
//!   blocks; completion is signalled on a `tokio` channel.
//! - **Swappable Classes:** strategy classes live in a registry that can be reloaded
//!   between tasks.
//!
//! ## Public API
//!
//! - `BacktesterEngine`: the service.
//! - `BacktestRequest` / `OptimizationRequest`: what a task runs.
//! - `EngineError`: the errors surfaced to callers.

pub mod error;
pub mod service;

pub use error::EngineError;
pub use service::{BacktestRequest, BacktesterEngine, OptimizationRequest};
