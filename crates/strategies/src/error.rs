use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("An error occurred during indicator calculation: {0}")]
    IndicatorError(String),

    #[error("Strategy class '{0}' not found")]
    StrategyNotFound(String),

    #[error("Strategy class '{0}' is invalid: {1}")]
    InvalidClass(String, String),
}
