use crate::error::BacktestError;
use configuration::{BacktestParameters, SettingMap};
use core_types::DailyResult;
use strategies::StrategyClass;

/// The matching engine that replays history against one strategy.
///
/// Implementations own data loading, order matching and daily mark-to-market. A
/// driver calls the methods in declaration order; `clear_data` resets the engine
/// so it can be driven again.
pub trait BacktestingEngine: Send {
    fn set_parameters(&mut self, parameters: &BacktestParameters) -> Result<(), BacktestError>;

    /// Instantiates `class` with `setting` applied over its defaults.
    fn add_strategy(&mut self, class: &StrategyClass, setting: &SettingMap) -> Result<(), BacktestError>;

    fn load_data(&mut self) -> Result<(), BacktestError>;

    /// Whether `load_data` found any history for the configured range.
    fn has_history_data(&self) -> bool;

    fn run_backtesting(&mut self) -> Result<(), BacktestError>;

    /// Daily results of the last run, in date order.
    fn daily_results(&mut self) -> Result<Vec<DailyResult>, BacktestError>;

    fn clear_data(&mut self);
}

/// Creates fresh, independent engines.
///
/// Every call must return an engine that shares no mutable state with any other,
/// because the optimizer calls it from several threads at once.
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Box<dyn BacktestingEngine>;
}

impl<F> EngineFactory for F
where
    F: Fn() -> Box<dyn BacktestingEngine> + Send + Sync,
{
    fn create(&self) -> Box<dyn BacktestingEngine> {
        self()
    }
}
