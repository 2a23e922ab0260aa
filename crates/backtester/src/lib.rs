//! # CTA Backtester
//!
//! This crate drives a single backtest: it configures an external matching engine,
//! hands it a strategy, runs it and turns the resulting daily P&L into statistics.
//!
//! ## Architectural Principles
//!
//! - **Engine At Arm's Length:** order matching and history loading belong to an
//!   implementation of `BacktestingEngine`; this crate only sequences the calls.
//! - **One Run, One Thread:** a `Backtester` run is deterministic and single
//!   threaded. Parallelism lives one level up, in the optimizer.
//!
//! ## Public API
//!
//! - `BacktestingEngine` / `EngineFactory`: the engine interface and its constructor.
//! - `Backtester`: runs one backtest and returns a `BacktestOutcome`.
//! - `BacktestError`: the errors a run can end with.

use analytics::{BalanceCurve, ChartData, StatisticsEngine, StatisticsRecord, DEFAULT_HISTOGRAM_BINS};
use configuration::{BacktestParameters, SettingMap, StatisticsSettings};
use core_types::DailyResult;
use strategies::StrategyClass;

pub mod engine;
pub mod error;

pub use engine::{BacktestingEngine, EngineFactory};
pub use error::BacktestError;

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestOutcome {
    pub daily_results: Vec<DailyResult>,
    pub curve: BalanceCurve,
    pub statistics: StatisticsRecord,
}

impl BacktestOutcome {
    pub fn chart(&self) -> ChartData {
        ChartData::from_curve(&self.curve, DEFAULT_HISTOGRAM_BINS)
    }
}

/// Runs backtests on one engine.
pub struct Backtester {
    engine: Box<dyn BacktestingEngine>,
    statistics: StatisticsSettings,
}

impl Backtester {
    pub fn new(engine: Box<dyn BacktestingEngine>, statistics: StatisticsSettings) -> Self {
        Self { engine, statistics }
    }

    /// Builds a backtester around a fresh engine from `factory`.
    pub fn from_factory(factory: &dyn EngineFactory, statistics: StatisticsSettings) -> Self {
        Self::new(factory.create(), statistics)
    }

    /// Runs `class` configured with `setting` over the range in `parameters`.
    ///
    /// The engine is cleared first, so a `Backtester` can be reused for several runs.
    pub fn run(
        &mut self,
        parameters: &BacktestParameters,
        class: &StrategyClass,
        setting: &SettingMap,
    ) -> Result<BacktestOutcome, BacktestError> {
        parameters.validate()?;
        let statistics_engine = StatisticsEngine::new(parameters.capital, self.statistics)?;

        tracing::info!(
            class = class.name,
            vt_symbol = %parameters.vt_symbol,
            start = %parameters.start,
            end = %parameters.end,
            "Starting backtest"
        );

        self.engine.clear_data();
        self.engine.set_parameters(parameters)?;
        self.engine.add_strategy(class, setting)?;
        self.engine.load_data()?;

        if !self.engine.has_history_data() {
            tracing::warn!(vt_symbol = %parameters.vt_symbol, "No history data for the requested range");
            return Err(BacktestError::DataUnavailable);
        }

        self.engine.run_backtesting()?;
        let daily_results = self.engine.daily_results()?;
        tracing::debug!(days = daily_results.len(), "Backtest finished, computing statistics");

        let report = statistics_engine.calculate(&daily_results);
        Ok(BacktestOutcome {
            daily_results,
            curve: report.curve,
            statistics: report.record,
        })
    }
}
