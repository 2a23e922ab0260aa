use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Backtest error: {0}")]
    Backtest(#[from] backtester::BacktestError),

    #[error("Optimization error: {0}")]
    Optimizer(#[from] optimizer::OptimizerError),

    #[error("Failed to start the worker thread: {0}")]
    Worker(#[from] std::io::Error),
}
