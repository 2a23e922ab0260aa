use core_types::{Direction, EngineType, Offset, OrderId};
use serde::{Deserialize, Serialize};

/// A limit (or stop) order as requested by a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub direction: Direction,
    pub offset: Offset,
    pub price: f64,
    pub volume: f64,
    /// Local stop order instead of a resting limit order.
    pub stop: bool,
    /// Lock mode: open an opposite position instead of closing today's.
    pub lock: bool,
    /// Net-position mode.
    pub net: bool,
}

impl OrderRequest {
    /// A plain limit order with every flag off.
    pub fn limit(direction: Direction, offset: Offset, price: f64, volume: f64) -> Self {
        Self {
            direction,
            offset,
            price,
            volume,
            stop: false,
            lock: false,
            net: false,
        }
    }
}

/// The engine a strategy instance is hosted by, live or backtesting.
///
/// Implementations must deliver order and trade callbacks *after* `send_order`
/// returns, never from inside it, and must apply a fill to the strategy (position
/// update) before delivering the matching terminal order update.
pub trait OrderGateway: Send + Sync {
    /// Submits an order and returns the ids it was split into (empty if refused).
    fn send_order(&self, strategy_name: &str, request: &OrderRequest) -> Vec<OrderId>;

    fn cancel_order(&self, strategy_name: &str, orderid: &OrderId);

    fn cancel_all(&self, strategy_name: &str);

    fn engine_type(&self) -> EngineType;

    /// Minimum price increment of the strategy's instrument.
    fn pricetick(&self, strategy_name: &str) -> f64;

    /// Contract multiplier of the strategy's instrument.
    fn size(&self, strategy_name: &str) -> f64;

    /// Hook for engines that surface strategy logs to a user interface.
    fn write_log(&self, strategy_name: &str, message: &str) {
        let _ = (strategy_name, message);
    }
}
