#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use core_types::{
    BarData, Direction, EngineType, Interval, Offset, OrderData, OrderId, Status, TickData,
    TradeData,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use strategies::{OrderGateway, OrderRequest};

/// Records every request and hands out sequential order ids.
pub struct RecordingGateway {
    engine_type: EngineType,
    next_id: AtomicU64,
    pub sent: Mutex<Vec<(OrderId, OrderRequest)>>,
    pub cancelled: Mutex<Vec<OrderId>>,
    pub cancel_all_calls: AtomicU64,
}

impl RecordingGateway {
    pub fn new(engine_type: EngineType) -> Self {
        Self {
            engine_type,
            next_id: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            cancel_all_calls: AtomicU64::new(0),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn last_sent(&self) -> (OrderId, OrderRequest) {
        self.sent.lock().last().cloned().expect("no order was sent")
    }

    pub fn cancelled(&self) -> Vec<OrderId> {
        self.cancelled.lock().clone()
    }
}

impl OrderGateway for RecordingGateway {
    fn send_order(&self, _strategy_name: &str, request: &OrderRequest) -> Vec<OrderId> {
        let id = OrderId::new(format!("o{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1));
        self.sent.lock().push((id.clone(), request.clone()));
        vec![id]
    }

    fn cancel_order(&self, _strategy_name: &str, orderid: &OrderId) {
        self.cancelled.lock().push(orderid.clone());
    }

    fn cancel_all(&self, _strategy_name: &str) {
        self.cancel_all_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn engine_type(&self) -> EngineType {
        self.engine_type
    }

    fn pricetick(&self, _strategy_name: &str) -> f64 {
        0.2
    }

    fn size(&self, _strategy_name: &str) -> f64 {
        300.0
    }
}

pub fn tick(bid: f64, ask: f64, limit_up: Option<f64>, limit_down: Option<f64>) -> TickData {
    TickData {
        symbol: "IF888".to_string(),
        exchange: "CFFEX".to_string(),
        datetime: Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
        last_price: (bid + ask) / 2.0,
        volume: 100.0,
        bid_price_1: bid,
        ask_price_1: ask,
        bid_volume_1: 5.0,
        ask_volume_1: 5.0,
        limit_up,
        limit_down,
    }
}

pub fn bar(close: f64) -> BarData {
    BarData {
        symbol: "IF888".to_string(),
        exchange: "CFFEX".to_string(),
        datetime: Utc.with_ymd_and_hms(2024, 1, 2, 9, 31, 0).unwrap(),
        interval: Interval::Minute,
        open_price: close,
        high_price: close,
        low_price: close,
        close_price: close,
        volume: 10.0,
        turnover: 0.0,
        open_interest: 0.0,
    }
}

pub fn order_update(orderid: &OrderId, request: &OrderRequest, traded: f64, status: Status) -> OrderData {
    OrderData {
        symbol: "IF888".to_string(),
        exchange: "CFFEX".to_string(),
        orderid: orderid.clone(),
        direction: request.direction,
        offset: request.offset,
        price: request.price,
        volume: request.volume,
        traded,
        status,
        datetime: None,
    }
}

pub fn fill(orderid: &OrderId, direction: Direction, offset: Offset, volume: f64) -> TradeData {
    TradeData {
        symbol: "IF888".to_string(),
        exchange: "CFFEX".to_string(),
        orderid: orderid.clone(),
        tradeid: format!("t-{orderid}"),
        direction,
        offset,
        price: 0.0,
        volume,
        datetime: None,
    }
}
