//! # CTA Analytics Engine
//!
//! This crate turns a backtest's daily results into performance statistics. It acts
//! as the "unbiased judge" of a strategy.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external
//!   systems and depends only on `core-types` and `configuration`.
//! - **Stateless Calculation:** `StatisticsEngine` takes daily results and produces a
//!   `StatisticsRecord` from scratch on every call.
//! - **Degenerate Input Is Data:** an empty series, a ruined account, zero variance or
//!   zero drawdown produce zeroed statistics and a status, never an error.
//!
//! ## Public API
//!
//! - `StatisticsEngine`: the calculator.
//! - `StatisticsRecord`: the fixed-shape result, also available as a flat name → value map.
//! - `BalanceCurve` / `ChartData`: the balance series and the datasets for result charts.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod balance;
pub mod chart;
pub mod engine;
pub mod error;
pub mod ewm;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use balance::{BalanceCurve, BalancePoint};
pub use chart::{histogram, ChartData, ChartPoint, HistogramBin, DEFAULT_HISTOGRAM_BINS};
pub use engine::{StatisticsEngine, StatisticsReport};
pub use error::AnalyticsError;
pub use report::{StatisticsRecord, StatisticsStatus, METRIC_NAMES};
