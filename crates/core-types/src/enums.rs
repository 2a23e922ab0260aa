use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The side of an order or fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }

    /// +1 for long, -1 for short. Used to turn fill volumes into position deltas.
    pub fn sign(&self) -> i64 {
        match self {
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }
}

/// Whether an order opens new exposure or closes existing exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Offset {
    Open,
    Close,
}

/// Lifecycle status of an order as reported by the execution venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Submitted,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

impl Status {
    /// An order is active until it reaches a terminal status.
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Submitted | Status::PartiallyFilled)
    }
}

/// Which kind of engine is hosting a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineType {
    Live,
    Backtesting,
}

/// Bar interval of the market data feeding a backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "tick")]
    Tick,
    #[serde(rename = "1m")]
    Minute,
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "d")]
    Daily,
    #[serde(rename = "w")]
    Weekly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Tick => "tick",
            Interval::Minute => "1m",
            Interval::Hour => "1h",
            Interval::Daily => "d",
            Interval::Weekly => "w",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tick" => Ok(Interval::Tick),
            "1m" => Ok(Interval::Minute),
            "1h" => Ok(Interval::Hour),
            "d" => Ok(Interval::Daily),
            "w" => Ok(Interval::Weekly),
            other => Err(CoreError::InvalidInput(
                "interval".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// Whether a backtest replays bars or ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BacktestingMode {
    Bar,
    Tick,
}

impl BacktestingMode {
    /// Tick data is replayed tick by tick; every other interval is replayed as bars.
    pub fn for_interval(interval: Interval) -> Self {
        match interval {
            Interval::Tick => BacktestingMode::Tick,
            _ => BacktestingMode::Bar,
        }
    }
}
