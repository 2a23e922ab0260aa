//! Position-target execution.
//!
//! A strategy built on `TargetPosTemplate` only declares the net position it wants
//! (`set_target_pos`). The template owns the orders needed to get there: it prices
//! them aggressively off the latest quote, cancels stale orders when the target
//! moves, and re-evaluates whenever its last outstanding order reaches a terminal
//! status. Only the most recent target is ever acted upon.
//!
//! All mutable state of one instance sits behind a single lock that is held for the
//! whole of each callback, including the calls into the gateway. Gateways therefore
//! must not call back into the strategy from inside `send_order`/`cancel_order`.

use crate::factory::StrategyInit;
use crate::gateway::OrderGateway;
use crate::template::{OrderRouter, TemplateState};
use crate::StrategyCore;
use configuration::SettingMap;
use core_types::{BarData, EngineType, OrderData, OrderId, TickData, TradeData};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

/// Price offset added beyond the touch when pricing orders.
pub const DEFAULT_TICK_ADD: f64 = 1.0;

/// What the controller is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    /// No working orders.
    Idle,
    /// Orders are working towards the current target.
    Adjusting,
    /// Stale orders have been asked to cancel; waiting for them to finish.
    Cancelling,
}

#[derive(Debug, Default)]
struct TargetPosState {
    base: TemplateState,
    target_pos: i64,
    last_tick: Option<TickData>,
    last_bar: Option<BarData>,
    active_orderids: Vec<OrderId>,
    cancel_orderids: HashSet<OrderId>,
}

impl TargetPosState {
    fn controller_state(&self) -> ControllerState {
        if self.active_orderids.is_empty() {
            ControllerState::Idle
        } else if self
            .active_orderids
            .iter()
            .any(|id| self.cancel_orderids.contains(id))
        {
            ControllerState::Cancelling
        } else {
            ControllerState::Adjusting
        }
    }
}

/// CTA template that trades towards a target net position.
pub struct TargetPosTemplate {
    router: OrderRouter,
    tick_add: f64,
    state: Mutex<TargetPosState>,
}

impl TargetPosTemplate {
    pub fn new(
        strategy_name: impl Into<String>,
        vt_symbol: impl Into<String>,
        gateway: Arc<dyn OrderGateway>,
    ) -> Self {
        Self {
            router: OrderRouter::new(strategy_name, vt_symbol, gateway),
            tick_add: DEFAULT_TICK_ADD,
            state: Mutex::new(TargetPosState::default()),
        }
    }

    pub fn from_init(init: &StrategyInit) -> Self {
        Self::new(init.strategy_name.clone(), init.vt_symbol.clone(), init.gateway.clone())
    }

    /// Sets the price offset applied beyond the bid/ask (or bar close).
    pub fn with_tick_add(mut self, tick_add: f64) -> Self {
        self.tick_add = tick_add;
        self
    }

    pub fn tick_add(&self) -> f64 {
        self.tick_add
    }

    pub fn router(&self) -> &OrderRouter {
        &self.router
    }

    // --- Market data & order callbacks ---

    pub fn on_tick(&self, tick: &TickData) {
        self.state.lock().last_tick = Some(tick.clone());
    }

    pub fn on_bar(&self, bar: &BarData) {
        self.state.lock().last_bar = Some(bar.clone());
    }

    /// Forgets an order once it is terminal and re-trades if nothing else is working.
    ///
    /// Repeated terminal updates for the same order are ignored.
    pub fn on_order(&self, order: &OrderData) {
        if order.is_active() {
            return;
        }

        let mut state = self.state.lock();
        let before = state.active_orderids.len();
        state.active_orderids.retain(|id| id != &order.orderid);
        let removed = state.active_orderids.len() != before;
        state.cancel_orderids.remove(&order.orderid);

        if removed && state.active_orderids.is_empty() {
            tracing::debug!(
                strategy = %self.router.strategy_name(),
                orderid = %order.orderid,
                status = ?order.status,
                "Last working order finished, re-evaluating target"
            );
            self.trade(&mut state);
        }
    }

    // --- Target control ---

    /// Declares the desired net position.
    pub fn set_target_pos(&self, target_pos: i64) {
        let mut state = self.state.lock();
        state.target_pos = target_pos;
        if target_pos == state.base.pos {
            return;
        }
        tracing::debug!(
            strategy = %self.router.strategy_name(),
            target_pos,
            pos = state.base.pos,
            "Target position changed"
        );
        self.trade(&mut state);
    }

    pub fn target_pos(&self) -> i64 {
        self.state.lock().target_pos
    }

    /// True when no order is working.
    pub fn check_order_finished(&self) -> bool {
        self.state.lock().active_orderids.is_empty()
    }

    pub fn controller_state(&self) -> ControllerState {
        self.state.lock().controller_state()
    }

    pub fn active_orderids(&self) -> Vec<OrderId> {
        self.state.lock().active_orderids.clone()
    }

    pub fn cancel_all(&self) {
        let state = self.state.lock();
        self.router.cancel_all(&state.base);
    }

    pub fn write_log(&self, message: &str) {
        self.router.write_log(message);
    }

    fn trade(&self, state: &mut TargetPosState) {
        if state.active_orderids.is_empty() {
            self.send_new_order(state);
        } else {
            self.cancel_old_order(state);
        }
    }

    fn cancel_old_order(&self, state: &mut TargetPosState) {
        let TargetPosState {
            base,
            active_orderids,
            cancel_orderids,
            ..
        } = state;

        for orderid in active_orderids.iter() {
            if cancel_orderids.insert(orderid.clone()) {
                self.router.cancel_order(base, orderid);
            }
        }
    }

    fn send_new_order(&self, state: &mut TargetPosState) {
        let pos_change = state.target_pos - state.base.pos;
        if pos_change == 0 {
            return;
        }

        let increase = pos_change > 0;
        let Some(price) = self.order_price(state, increase) else {
            tracing::warn!(
                strategy = %self.router.strategy_name(),
                target_pos = state.target_pos,
                pos = state.base.pos,
                "No tick or bar received yet, cannot price order"
            );
            return;
        };

        let orderids = match self.router.engine_type() {
            EngineType::Backtesting => {
                let volume = pos_change.unsigned_abs() as f64;
                if increase {
                    self.router.buy(&state.base, price, volume)
                } else {
                    self.router.short(&state.base, price, volume)
                }
            }
            EngineType::Live => {
                if !state.active_orderids.is_empty() {
                    return;
                }
                self.send_live_order(&state.base, pos_change, price)
            }
        };

        state.active_orderids.extend(orderids);
    }

    /// Live venues separate open and close legs; close the opposite position first.
    fn send_live_order(&self, base: &TemplateState, pos_change: i64, price: f64) -> Vec<OrderId> {
        let pos = base.pos;
        if pos_change > 0 {
            if pos < 0 {
                let volume = if pos_change < pos.abs() { pos_change } else { pos.abs() };
                self.router.cover(base, price, volume as f64)
            } else {
                self.router.buy(base, price, pos_change as f64)
            }
        } else {
            let change = pos_change.abs();
            if pos > 0 {
                let volume = if change < pos { change } else { pos };
                self.router.sell(base, price, volume as f64)
            } else {
                self.router.short(base, price, change as f64)
            }
        }
    }

    /// Crosses the spread by `tick_add`, clamped to the daily price limits.
    /// Falls back to the last bar close when no tick has been seen.
    fn order_price(&self, state: &TargetPosState, increase: bool) -> Option<f64> {
        if let Some(tick) = &state.last_tick {
            let price = if increase {
                let price = tick.ask_price_1 + self.tick_add;
                match tick.limit_up.filter(|limit| *limit > 0.0) {
                    Some(limit) => price.min(limit),
                    None => price,
                }
            } else {
                let price = tick.bid_price_1 - self.tick_add;
                match tick.limit_down.filter(|limit| *limit > 0.0) {
                    Some(limit) => price.max(limit),
                    None => price,
                }
            };
            return Some(price);
        }

        state.last_bar.as_ref().map(|bar| {
            if increase {
                bar.close_price + self.tick_add
            } else {
                bar.close_price - self.tick_add
            }
        })
    }
}

impl StrategyCore for TargetPosTemplate {
    fn strategy_name(&self) -> &str {
        self.router.strategy_name()
    }

    fn vt_symbol(&self) -> &str {
        self.router.vt_symbol()
    }

    fn inited(&self) -> bool {
        self.state.lock().base.inited
    }

    fn set_inited(&self, inited: bool) {
        self.state.lock().base.inited = inited;
    }

    fn trading(&self) -> bool {
        self.state.lock().base.trading
    }

    fn set_trading(&self, trading: bool) {
        self.state.lock().base.trading = trading;
    }

    fn pos(&self) -> i64 {
        self.state.lock().base.pos
    }

    fn apply_trade(&self, trade: &TradeData) {
        let mut state = self.state.lock();
        state.base.apply_trade(trade);
        tracing::debug!(
            strategy = %self.router.strategy_name(),
            tradeid = %trade.tradeid,
            pos = state.base.pos,
            "Fill applied"
        );
    }

    fn variables(&self) -> SettingMap {
        let state = self.state.lock();
        let mut map = state.base.variables();
        map.insert("target_pos".to_string(), json!(state.target_pos));
        map
    }
}
