use crate::error::EventsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Enum representing the severity of a log message for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// A structured log line produced while a task runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogMessage {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

/// Everything the backtester service tells its caller.
///
/// Serialized with `#[serde(tag = "type", content = "payload")]`, so a log line becomes
/// `{ "type": "Log", "payload": { "timestamp": "...", "level": "Info", "message": "..." } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum BacktesterEvent {
    Log(LogMessage),
    /// A single backtest finished and its results are ready to be fetched.
    BacktestingFinished { run_id: Uuid },
    /// An optimization sweep finished and its ranked results are ready to be fetched.
    OptimizationFinished { run_id: Uuid },
}

impl BacktesterEvent {
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        BacktesterEvent::Log(LogMessage::new(level, message))
    }

    pub fn to_json(&self) -> Result<String, EventsError> {
        Ok(serde_json::to_string(self)?)
    }
}
