use crate::enums::{Direction, Interval, Offset, Status};
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Joins a symbol and an exchange into the `symbol.exchange` form used as an
/// instrument key throughout the system.
pub fn vt_symbol(symbol: &str, exchange: &str) -> String {
    format!("{symbol}.{exchange}")
}

/// Splits a `symbol.exchange` key. The exchange is everything after the last dot.
pub fn split_vt_symbol(vt_symbol: &str) -> Result<(String, String), CoreError> {
    match vt_symbol.rsplit_once('.') {
        Some((symbol, exchange)) if !symbol.is_empty() && !exchange.is_empty() => {
            Ok((symbol.to_string(), exchange.to_string()))
        }
        _ => Err(CoreError::InvalidInput(
            "vt_symbol".to_string(),
            vt_symbol.to_string(),
        )),
    }
}

/// Opaque identifier assigned to an order by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A level-1 market snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickData {
    pub symbol: String,
    pub exchange: String,
    pub datetime: DateTime<Utc>,
    pub last_price: f64,
    pub volume: f64,
    pub bid_price_1: f64,
    pub ask_price_1: f64,
    pub bid_volume_1: f64,
    pub ask_volume_1: f64,
    /// Upper daily price limit, when the venue publishes one.
    pub limit_up: Option<f64>,
    /// Lower daily price limit, when the venue publishes one.
    pub limit_down: Option<f64>,
}

impl TickData {
    pub fn vt_symbol(&self) -> String {
        vt_symbol(&self.symbol, &self.exchange)
    }
}

/// An OHLC bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarData {
    pub symbol: String,
    pub exchange: String,
    pub datetime: DateTime<Utc>,
    pub interval: Interval,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub volume: f64,
    pub turnover: f64,
    pub open_interest: f64,
}

impl BarData {
    pub fn vt_symbol(&self) -> String {
        vt_symbol(&self.symbol, &self.exchange)
    }
}

/// The venue's view of an order at a point in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    pub symbol: String,
    pub exchange: String,
    pub orderid: OrderId,
    pub direction: Direction,
    pub offset: Offset,
    pub price: f64,
    pub volume: f64,
    pub traded: f64,
    pub status: Status,
    pub datetime: Option<DateTime<Utc>>,
}

impl OrderData {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn vt_symbol(&self) -> String {
        vt_symbol(&self.symbol, &self.exchange)
    }
}

/// A confirmed fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeData {
    pub symbol: String,
    pub exchange: String,
    pub orderid: OrderId,
    pub tradeid: String,
    pub direction: Direction,
    pub offset: Offset,
    pub price: f64,
    pub volume: f64,
    pub datetime: Option<DateTime<Utc>>,
}

impl TradeData {
    /// The signed change this fill applies to a net position.
    pub fn position_delta(&self) -> i64 {
        self.direction.sign() * self.volume.round() as i64
    }
}

/// One trading day of mark-to-market results, produced by the backtesting engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub net_pnl: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default)]
    pub slippage: f64,
    #[serde(default)]
    pub turnover: f64,
    #[serde(default)]
    pub trade_count: u32,
}

impl DailyResult {
    /// A day with only a net P&L figure and no trading costs.
    pub fn with_pnl(date: NaiveDate, net_pnl: f64) -> Self {
        Self {
            date,
            net_pnl,
            commission: 0.0,
            slippage: 0.0,
            turnover: 0.0,
            trade_count: 0,
        }
    }
}
