//! # CTA Core Types
//!
//! The shared data model of the workspace: order and market-data records exchanged
//! between strategies and the external execution engine, plus the per-day
//! `DailyResult` rows consumed by the statistics engine.
//!
//! As a Layer 0 crate it depends on no other workspace crate.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{BacktestingMode, Direction, EngineType, Interval, Offset, Status};
pub use error::CoreError;
pub use structs::{
    split_vt_symbol, vt_symbol, BarData, DailyResult, OrderData, OrderId, TickData, TradeData,
};
