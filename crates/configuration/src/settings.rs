use crate::error::ConfigError;
use crate::json_store::SettingMap;
use chrono::NaiveDate;
use core_types::{split_vt_symbol, BacktestingMode, Interval};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Starting capital used when a caller does not supply one.
    #[serde(default = "default_capital")]
    pub capital: f64,
    #[serde(default)]
    pub statistics: StatisticsSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_capital() -> f64 {
    1_000_000.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capital: default_capital(),
            statistics: StatisticsSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.capital > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "capital must be positive, got {}",
                self.capital
            )));
        }
        self.statistics.validate()
    }
}

/// Parameters of the performance statistics calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsSettings {
    /// Annual risk-free rate, in percent.
    pub risk_free: f64,
    /// Trading days per year.
    pub annual_days: u32,
    /// Half-life, in days, of the exponentially-weighted Sharpe ratio.
    pub half_life: f64,
}

impl Default for StatisticsSettings {
    fn default() -> Self {
        Self {
            risk_free: 0.0,
            annual_days: 240,
            half_life: 120.0,
        }
    }
}

impl StatisticsSettings {
    pub const RISK_FREE_KEY: &'static str = "risk_free";
    pub const ANNUAL_DAYS_KEY: &'static str = "annual_days";
    pub const HALF_LIFE_KEY: &'static str = "half_life";

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.annual_days == 0 {
            return Err(ConfigError::ValidationError(
                "annual_days must be greater than zero".to_string(),
            ));
        }
        if !(self.half_life > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "half_life must be positive, got {}",
                self.half_life
            )));
        }
        if !self.risk_free.is_finite() {
            return Err(ConfigError::ValidationError(
                "risk_free must be a finite number".to_string(),
            ));
        }
        Ok(())
    }

    /// Overrides fields from a flat settings mapping.
    ///
    /// Keys that are absent are left alone; ill-typed values are skipped with a warning.
    pub fn apply_overrides(&mut self, settings: &SettingMap) {
        if let Some(value) = settings.get(Self::RISK_FREE_KEY) {
            match value.as_f64() {
                Some(v) => self.risk_free = v,
                None => tracing::warn!(key = Self::RISK_FREE_KEY, %value, "Ignoring non-numeric setting"),
            }
        }
        if let Some(value) = settings.get(Self::ANNUAL_DAYS_KEY) {
            match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                Some(v) => self.annual_days = v,
                None => tracing::warn!(key = Self::ANNUAL_DAYS_KEY, %value, "Ignoring non-integer setting"),
            }
        }
        if let Some(value) = settings.get(Self::HALF_LIFE_KEY) {
            match value.as_f64() {
                Some(v) => self.half_life = v,
                None => tracing::warn!(key = Self::HALF_LIFE_KEY, %value, "Ignoring non-numeric setting"),
            }
        }
    }
}

/// Where and how loudly the application logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Directory for a daily-rolling log file. Console only when unset.
    pub directory: Option<PathBuf>,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            ansi: true,
        }
    }
}

/// Contains parameters for a single backtest run.
///
/// This record is passed by value to worker threads, so it only holds plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestParameters {
    /// Instrument key in `symbol.exchange` form.
    pub vt_symbol: String,
    pub interval: Interval,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Commission rate applied to turnover.
    pub rate: f64,
    /// Slippage per unit, in price terms.
    pub slippage: f64,
    /// Contract multiplier.
    pub size: f64,
    /// Minimum price increment.
    pub pricetick: f64,
    pub capital: f64,
    /// Replay mode. Derived from `interval` when absent.
    #[serde(default)]
    pub mode: Option<BacktestingMode>,
}

impl BacktestParameters {
    pub fn mode(&self) -> BacktestingMode {
        self.mode
            .unwrap_or_else(|| BacktestingMode::for_interval(self.interval))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        split_vt_symbol(&self.vt_symbol)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        if self.start > self.end {
            return Err(ConfigError::ValidationError(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        for (name, value) in [
            ("capital", self.capital),
            ("size", self.size),
            ("pricetick", self.pricetick),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_parameters() -> BacktestParameters {
        BacktestParameters {
            vt_symbol: "IF888.CFFEX".to_string(),
            interval: Interval::Minute,
            start: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(),
            rate: 0.3 / 10_000.0,
            slippage: 0.2,
            size: 300.0,
            pricetick: 0.2,
            capital: 1_000_000.0,
            mode: None,
        }
    }

    #[test]
    fn statistics_defaults() {
        let settings = StatisticsSettings::default();
        assert_eq!(settings.risk_free, 0.0);
        assert_eq!(settings.annual_days, 240);
        assert_eq!(settings.half_life, 120.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn overrides_skip_ill_typed_values() {
        let mut settings = StatisticsSettings::default();
        let map = json!({ "risk_free": 2.5, "annual_days": "many", "half_life": 60 });
        settings.apply_overrides(map.as_object().unwrap());
        assert_eq!(settings.risk_free, 2.5);
        assert_eq!(settings.annual_days, 240);
        assert_eq!(settings.half_life, 60.0);
    }

    #[test]
    fn zero_annual_days_is_rejected() {
        let settings = StatisticsSettings {
            annual_days: 0,
            ..StatisticsSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn mode_defaults_from_interval() {
        let mut params = sample_parameters();
        assert_eq!(params.mode(), BacktestingMode::Bar);
        params.interval = Interval::Tick;
        assert_eq!(params.mode(), BacktestingMode::Tick);
        params.mode = Some(BacktestingMode::Bar);
        assert_eq!(params.mode(), BacktestingMode::Bar);
    }

    #[test]
    fn backtest_parameters_validation() {
        assert!(sample_parameters().validate().is_ok());

        let mut params = sample_parameters();
        params.vt_symbol = "IF888".to_string();
        assert!(params.validate().is_err());

        let mut params = sample_parameters();
        params.end = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        assert!(params.validate().is_err());

        let mut params = sample_parameters();
        params.size = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn backtest_parameters_serialize_as_plain_record() {
        let value = serde_json::to_value(sample_parameters()).unwrap();
        assert_eq!(value["interval"], "1m");
        assert_eq!(value["start"], "2023-01-03");
        let back: BacktestParameters = serde_json::from_value(value).unwrap();
        assert_eq!(back, sample_parameters());
    }
}
