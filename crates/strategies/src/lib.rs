//! # CTA Strategy Library
//!
//! This crate contains the strategy side of the system: the interface every CTA
//! strategy implements, the order plumbing between a strategy and the engine that
//! hosts it, and the position-target execution controller.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It never matches orders or loads
//!   data; it talks to its host only through the `OrderGateway` trait.
//! - **Engine Agnostic Strategies:** By using the `Strategy` trait, the backtester and
//!   a live engine can host any strategy without knowing its internal details.
//! - **Single Lock Per Instance:** Each template keeps its mutable state behind one
//!   `parking_lot::Mutex`, so every callback observes and mutates a consistent view.
//! - **Extensibility:** Adding a strategy means implementing `Strategy`, declaring a
//!   `ParameterSchema`, and registering a `StrategyClass`.
//!
//! ## Public API
//!
//! - `Strategy` / `StrategyCore`: what engines call on a strategy instance.
//! - `OrderGateway`: what a strategy calls on its engine.
//! - `StrategyTemplate`: plain `buy`/`sell`/`short`/`cover` helpers.
//! - `TargetPosTemplate`: trades towards a declared target position.
//! - `StrategyRegistry` / `StrategyClass`: loading and instantiating classes by name.
//! - `DoubleMaStrategy`: the bundled moving-average crossover strategy.

// Declare all the modules that constitute this crate.
pub mod double_ma;
pub mod error;
pub mod factory;
pub mod gateway;
pub mod parameters;
pub mod target_pos;
pub mod template;

// Re-export the key components to create a clean, public-facing API.
pub use double_ma::DoubleMaStrategy;
pub use error::StrategyError;
pub use factory::{builtin_classes, StrategyClass, StrategyConstructor, StrategyInit, StrategyRegistry};
pub use gateway::{OrderGateway, OrderRequest};
pub use parameters::{ParameterDefault, ParameterSchema, ParameterSpec, StrategyParameters};
pub use target_pos::{ControllerState, TargetPosTemplate, DEFAULT_TICK_ADD};
pub use template::{OrderRouter, StrategyTemplate, TemplateState};

use configuration::SettingMap;
use core_types::{BarData, OrderData, TickData, TradeData};
use serde::Serialize;

/// Lifecycle flags, position and order routing of a strategy instance.
///
/// The hosting engine drives `inited`/`trading` and reports confirmed fills through
/// `apply_trade`, which is the only way the position changes.
pub trait StrategyCore: Send + Sync {
    fn strategy_name(&self) -> &str;
    fn vt_symbol(&self) -> &str;
    fn inited(&self) -> bool;
    fn set_inited(&self, inited: bool);
    fn trading(&self) -> bool;
    fn set_trading(&self, trading: bool);
    fn pos(&self) -> i64;
    fn apply_trade(&self, trade: &TradeData);
    fn variables(&self) -> SettingMap;
}

/// The interface every CTA strategy implements.
///
/// All callbacks default to no-ops. For a fill the engine calls
/// `core().apply_trade` first, then `on_trade`, then the order update via `on_order`.
pub trait Strategy: Send {
    fn class_name(&self) -> &str;

    fn author(&self) -> &str {
        ""
    }

    fn core(&self) -> &dyn StrategyCore;

    fn parameters(&self) -> &StrategyParameters;

    fn on_init(&mut self) {}

    fn on_start(&mut self) {}

    fn on_stop(&mut self) {}

    fn on_tick(&mut self, _tick: &TickData) {}

    fn on_bar(&mut self, _bar: &BarData) {}

    fn on_trade(&mut self, _trade: &TradeData) {}

    fn on_order(&mut self, _order: &OrderData) {}

    /// Runtime variables shown alongside the parameters.
    fn variables(&self) -> SettingMap {
        self.core().variables()
    }

    /// A snapshot of the instance for display or persistence.
    fn data(&self) -> StrategyData {
        StrategyData {
            strategy_name: self.core().strategy_name().to_string(),
            vt_symbol: self.core().vt_symbol().to_string(),
            class_name: self.class_name().to_string(),
            author: self.author().to_string(),
            parameters: self.parameters().to_map(),
            variables: self.variables(),
        }
    }
}

/// Serializable snapshot produced by `Strategy::data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyData {
    pub strategy_name: String,
    pub vt_symbol: String,
    pub class_name: String,
    pub author: String,
    pub parameters: SettingMap,
    pub variables: SettingMap,
}
