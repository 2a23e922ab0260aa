use crate::error::AnalyticsError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether the statistics describe a usable balance series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatisticsStatus {
    Valid,
    /// No daily results were supplied.
    NoData,
    /// The balance reached zero or below on `date`; every statistic is left at zero.
    Ruined { date: NaiveDate },
}

/// Names accepted by `StatisticsRecord::metric`, in display order.
pub const METRIC_NAMES: [&str; 25] = [
    "total_days",
    "profit_days",
    "loss_days",
    "capital",
    "end_balance",
    "max_drawdown",
    "max_ddpercent",
    "max_drawdown_duration",
    "total_net_pnl",
    "daily_net_pnl",
    "total_commission",
    "daily_commission",
    "total_slippage",
    "daily_slippage",
    "total_turnover",
    "daily_turnover",
    "total_trade_count",
    "daily_trade_count",
    "total_return",
    "annual_return",
    "daily_return",
    "return_std",
    "sharpe_ratio",
    "ewm_sharpe",
    "return_drawdown_ratio",
];

/// The fixed-shape result of a statistics calculation.
///
/// Every field is always present. Fields that could not be computed are zero,
/// never infinite or NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_days: u32,
    pub profit_days: u32,
    pub loss_days: u32,
    pub capital: f64,
    pub end_balance: f64,
    pub max_drawdown: f64,
    pub max_ddpercent: f64,
    /// Calendar days from the high-water mark to the deepest drawdown.
    pub max_drawdown_duration: i64,
    pub total_net_pnl: f64,
    pub daily_net_pnl: f64,
    pub total_commission: f64,
    pub daily_commission: f64,
    pub total_slippage: f64,
    pub daily_slippage: f64,
    pub total_turnover: f64,
    pub daily_turnover: f64,
    pub total_trade_count: u64,
    pub daily_trade_count: f64,
    pub total_return: f64,
    pub annual_return: f64,
    pub daily_return: f64,
    pub return_std: f64,
    pub sharpe_ratio: f64,
    pub ewm_sharpe: f64,
    pub return_drawdown_ratio: f64,
    pub status: StatisticsStatus,
}

impl StatisticsRecord {
    /// A record with every statistic at zero.
    pub fn empty(capital: f64) -> Self {
        Self {
            start_date: None,
            end_date: None,
            total_days: 0,
            profit_days: 0,
            loss_days: 0,
            capital,
            end_balance: 0.0,
            max_drawdown: 0.0,
            max_ddpercent: 0.0,
            max_drawdown_duration: 0,
            total_net_pnl: 0.0,
            daily_net_pnl: 0.0,
            total_commission: 0.0,
            daily_commission: 0.0,
            total_slippage: 0.0,
            daily_slippage: 0.0,
            total_turnover: 0.0,
            daily_turnover: 0.0,
            total_trade_count: 0,
            daily_trade_count: 0.0,
            total_return: 0.0,
            annual_return: 0.0,
            daily_return: 0.0,
            return_std: 0.0,
            sharpe_ratio: 0.0,
            ewm_sharpe: 0.0,
            return_drawdown_ratio: 0.0,
            status: StatisticsStatus::NoData,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == StatisticsStatus::Valid
    }

    /// Looks a numeric statistic up by name.
    pub fn metric(&self, name: &str) -> Option<f64> {
        let value = match name {
            "total_days" => self.total_days as f64,
            "profit_days" => self.profit_days as f64,
            "loss_days" => self.loss_days as f64,
            "capital" => self.capital,
            "end_balance" => self.end_balance,
            "max_drawdown" => self.max_drawdown,
            "max_ddpercent" => self.max_ddpercent,
            "max_drawdown_duration" => self.max_drawdown_duration as f64,
            "total_net_pnl" => self.total_net_pnl,
            "daily_net_pnl" => self.daily_net_pnl,
            "total_commission" => self.total_commission,
            "daily_commission" => self.daily_commission,
            "total_slippage" => self.total_slippage,
            "daily_slippage" => self.daily_slippage,
            "total_turnover" => self.total_turnover,
            "daily_turnover" => self.daily_turnover,
            "total_trade_count" => self.total_trade_count as f64,
            "daily_trade_count" => self.daily_trade_count,
            "total_return" => self.total_return,
            "annual_return" => self.annual_return,
            "daily_return" => self.daily_return,
            "return_std" => self.return_std,
            "sharpe_ratio" => self.sharpe_ratio,
            "ewm_sharpe" => self.ewm_sharpe,
            "return_drawdown_ratio" => self.return_drawdown_ratio,
            _ => return None,
        };
        Some(value)
    }

    /// Like `metric`, for callers that treat an unknown name as an error.
    pub fn target(&self, name: &str) -> Result<f64, AnalyticsError> {
        self.metric(name)
            .ok_or_else(|| AnalyticsError::UnknownMetric(name.to_string()))
    }

    /// Every numeric statistic keyed by name.
    pub fn to_flat_map(&self) -> BTreeMap<String, f64> {
        METRIC_NAMES
            .iter()
            .filter_map(|name| self.metric(name).map(|v| (name.to_string(), v)))
            .collect()
    }

    /// Replaces infinities and NaNs with zero.
    pub fn sanitize(&mut self) {
        for field in [
            &mut self.end_balance,
            &mut self.max_drawdown,
            &mut self.max_ddpercent,
            &mut self.total_net_pnl,
            &mut self.daily_net_pnl,
            &mut self.total_commission,
            &mut self.daily_commission,
            &mut self.total_slippage,
            &mut self.daily_slippage,
            &mut self.total_turnover,
            &mut self.daily_turnover,
            &mut self.daily_trade_count,
            &mut self.total_return,
            &mut self.annual_return,
            &mut self.daily_return,
            &mut self.return_std,
            &mut self.sharpe_ratio,
            &mut self.ewm_sharpe,
            &mut self.return_drawdown_ratio,
        ] {
            if !field.is_finite() {
                *field = 0.0;
            }
        }
    }

    /// Human-readable label/value pairs, in report order.
    pub fn summary_lines(&self) -> Vec<(&'static str, String)> {
        let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        vec![
            ("Start date", date(self.start_date)),
            ("End date", date(self.end_date)),
            ("Total days", self.total_days.to_string()),
            ("Profit days", self.profit_days.to_string()),
            ("Loss days", self.loss_days.to_string()),
            ("Capital", format!("{:.2}", self.capital)),
            ("End balance", format!("{:.2}", self.end_balance)),
            ("Total return", format!("{:.2}%", self.total_return)),
            ("Annual return", format!("{:.2}%", self.annual_return)),
            ("Max drawdown", format!("{:.2}", self.max_drawdown)),
            ("Max ddpercent", format!("{:.2}%", self.max_ddpercent)),
            ("Max drawdown duration", self.max_drawdown_duration.to_string()),
            ("Total net pnl", format!("{:.2}", self.total_net_pnl)),
            ("Total commission", format!("{:.2}", self.total_commission)),
            ("Total slippage", format!("{:.2}", self.total_slippage)),
            ("Total turnover", format!("{:.2}", self.total_turnover)),
            ("Total trade count", self.total_trade_count.to_string()),
            ("Daily net pnl", format!("{:.2}", self.daily_net_pnl)),
            ("Daily commission", format!("{:.2}", self.daily_commission)),
            ("Daily slippage", format!("{:.2}", self.daily_slippage)),
            ("Daily turnover", format!("{:.2}", self.daily_turnover)),
            ("Daily trade count", format!("{:.2}", self.daily_trade_count)),
            ("Daily return", format!("{:.2}%", self.daily_return)),
            ("Return std", format!("{:.2}%", self.return_std)),
            ("Sharpe ratio", format!("{:.2}", self.sharpe_ratio)),
            ("EWM Sharpe", format!("{:.2}", self.ewm_sharpe)),
            ("Return/drawdown ratio", format!("{:.2}", self.return_drawdown_ratio)),
        ]
    }

    /// Writes the summary to the log, one statistic per line.
    pub fn log_summary(&self) {
        tracing::info!("{}", "-".repeat(30));
        for (label, value) in self.summary_lines() {
            tracing::info!("{label}:\t{value}");
        }
    }
}

impl Default for StatisticsRecord {
    fn default() -> Self {
        Self::empty(0.0)
    }
}
