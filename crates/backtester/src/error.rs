use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Invalid backtest parameters: {0}")]
    Config(#[from] configuration::error::ConfigError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Historical data for the requested range is incomplete or missing.")]
    DataUnavailable,

    #[error("Backtesting engine failure: {0}")]
    Engine(String),
}
