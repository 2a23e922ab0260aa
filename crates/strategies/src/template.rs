use crate::factory::StrategyInit;
use crate::gateway::{OrderGateway, OrderRequest};
use crate::StrategyCore;
use configuration::SettingMap;
use core_types::{Direction, EngineType, Offset, OrderId, TradeData};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

/// Lifecycle flags and net position shared by every strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateState {
    pub inited: bool,
    pub trading: bool,
    pub pos: i64,
}

impl TemplateState {
    pub fn variables(&self) -> SettingMap {
        let mut map = SettingMap::new();
        map.insert("inited".to_string(), json!(self.inited));
        map.insert("trading".to_string(), json!(self.trading));
        map.insert("pos".to_string(), json!(self.pos));
        map
    }

    pub fn apply_trade(&mut self, trade: &TradeData) {
        self.pos += trade.position_delta();
    }
}

/// Routes one strategy instance's order requests to its gateway.
///
/// Every request is checked against the caller's `TemplateState`: while the
/// strategy is not trading, orders and cancels are dropped and `send_order`
/// returns no ids.
#[derive(Clone)]
pub struct OrderRouter {
    strategy_name: String,
    vt_symbol: String,
    gateway: Arc<dyn OrderGateway>,
}

impl OrderRouter {
    pub fn new(
        strategy_name: impl Into<String>,
        vt_symbol: impl Into<String>,
        gateway: Arc<dyn OrderGateway>,
    ) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            vt_symbol: vt_symbol.into(),
            gateway,
        }
    }

    pub fn strategy_name(&self) -> &str {
        &self.strategy_name
    }

    pub fn vt_symbol(&self) -> &str {
        &self.vt_symbol
    }

    /// Long open.
    pub fn buy(&self, state: &TemplateState, price: f64, volume: f64) -> Vec<OrderId> {
        self.send_order(state, &OrderRequest::limit(Direction::Long, Offset::Open, price, volume))
    }

    /// Short close.
    pub fn sell(&self, state: &TemplateState, price: f64, volume: f64) -> Vec<OrderId> {
        self.send_order(state, &OrderRequest::limit(Direction::Short, Offset::Close, price, volume))
    }

    /// Short open.
    pub fn short(&self, state: &TemplateState, price: f64, volume: f64) -> Vec<OrderId> {
        self.send_order(state, &OrderRequest::limit(Direction::Short, Offset::Open, price, volume))
    }

    /// Long close.
    pub fn cover(&self, state: &TemplateState, price: f64, volume: f64) -> Vec<OrderId> {
        self.send_order(state, &OrderRequest::limit(Direction::Long, Offset::Close, price, volume))
    }

    pub fn send_order(&self, state: &TemplateState, request: &OrderRequest) -> Vec<OrderId> {
        if !state.trading {
            tracing::debug!(strategy = %self.strategy_name, ?request, "Not trading, order dropped");
            return Vec::new();
        }
        tracing::debug!(strategy = %self.strategy_name, ?request, "Sending order");
        self.gateway.send_order(&self.strategy_name, request)
    }

    pub fn cancel_order(&self, state: &TemplateState, orderid: &OrderId) {
        if state.trading {
            self.gateway.cancel_order(&self.strategy_name, orderid);
        }
    }

    pub fn cancel_all(&self, state: &TemplateState) {
        if state.trading {
            self.gateway.cancel_all(&self.strategy_name);
        }
    }

    pub fn engine_type(&self) -> EngineType {
        self.gateway.engine_type()
    }

    pub fn pricetick(&self) -> f64 {
        self.gateway.pricetick(&self.strategy_name)
    }

    pub fn size(&self) -> f64 {
        self.gateway.size(&self.strategy_name)
    }

    pub fn write_log(&self, message: &str) {
        tracing::info!(strategy = %self.strategy_name, "{message}");
        self.gateway.write_log(&self.strategy_name, message);
    }
}

/// The plain CTA template: order helpers for strategies that manage their own orders.
pub struct StrategyTemplate {
    router: OrderRouter,
    state: Mutex<TemplateState>,
}

impl StrategyTemplate {
    pub fn new(
        strategy_name: impl Into<String>,
        vt_symbol: impl Into<String>,
        gateway: Arc<dyn OrderGateway>,
    ) -> Self {
        Self {
            router: OrderRouter::new(strategy_name, vt_symbol, gateway),
            state: Mutex::new(TemplateState::default()),
        }
    }

    pub fn from_init(init: &StrategyInit) -> Self {
        Self::new(init.strategy_name.clone(), init.vt_symbol.clone(), init.gateway.clone())
    }

    pub fn buy(&self, price: f64, volume: f64) -> Vec<OrderId> {
        self.router.buy(&self.state.lock(), price, volume)
    }

    pub fn sell(&self, price: f64, volume: f64) -> Vec<OrderId> {
        self.router.sell(&self.state.lock(), price, volume)
    }

    pub fn short(&self, price: f64, volume: f64) -> Vec<OrderId> {
        self.router.short(&self.state.lock(), price, volume)
    }

    pub fn cover(&self, price: f64, volume: f64) -> Vec<OrderId> {
        self.router.cover(&self.state.lock(), price, volume)
    }

    pub fn send_order(&self, request: &OrderRequest) -> Vec<OrderId> {
        self.router.send_order(&self.state.lock(), request)
    }

    pub fn cancel_order(&self, orderid: &OrderId) {
        self.router.cancel_order(&self.state.lock(), orderid);
    }

    pub fn cancel_all(&self) {
        self.router.cancel_all(&self.state.lock());
    }

    pub fn write_log(&self, message: &str) {
        self.router.write_log(message);
    }

    pub fn engine_type(&self) -> EngineType {
        self.router.engine_type()
    }

    pub fn pricetick(&self) -> f64 {
        self.router.pricetick()
    }

    pub fn size(&self) -> f64 {
        self.router.size()
    }

    pub fn router(&self) -> &OrderRouter {
        &self.router
    }
}

impl StrategyCore for StrategyTemplate {
    fn strategy_name(&self) -> &str {
        self.router.strategy_name()
    }

    fn vt_symbol(&self) -> &str {
        self.router.vt_symbol()
    }

    fn inited(&self) -> bool {
        self.state.lock().inited
    }

    fn set_inited(&self, inited: bool) {
        self.state.lock().inited = inited;
    }

    fn trading(&self) -> bool {
        self.state.lock().trading
    }

    fn set_trading(&self, trading: bool) {
        self.state.lock().trading = trading;
    }

    fn pos(&self) -> i64 {
        self.state.lock().pos
    }

    fn apply_trade(&self, trade: &TradeData) {
        self.state.lock().apply_trade(trade);
    }

    fn variables(&self) -> SettingMap {
        self.state.lock().variables()
    }
}
