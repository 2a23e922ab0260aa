//! # CTA Optimizer
//!
//! This crate sweeps a strategy's parameters and ranks the resulting backtests by
//! one statistic.
//!
//! ## Architectural Principles
//!
//! - **Pure Evaluation:** `evaluate` takes plain data, builds its own engine and
//!   returns a scored result. It is the only thing handed to worker threads.
//! - **Pluggable Search:** the `SearchStrategy` trait decides which parameter sets
//!   are evaluated; `BruteForceSearch` walks the whole grid on a rayon pool.
//!
//! ## Public API
//!
//! - `Optimizer`: validates a job and runs it with a search strategy.
//! - `Evaluator` / `evaluate`: score one parameter set.
//! - `generate_parameter_sets` / `check_optimization_setting`: grid expansion.

use configuration::{OptimizationSetting, SettingMap};

pub mod error;
pub mod evaluate;
pub mod generator;
pub mod search;

pub use error::OptimizerError;
pub use evaluate::{evaluate, get_target_value, EvaluationRequest, EvaluationResult, Evaluator};
pub use generator::{check_optimization_setting, generate_parameter_sets, MAX_COMBINATIONS};
pub use search::{BruteForceSearch, SearchStrategy};

/// A validated optimization job.
pub struct Optimizer {
    evaluator: Evaluator,
    setting: OptimizationSetting,
    parameter_sets: Vec<SettingMap>,
}

impl Optimizer {
    /// Validates `setting` and binds it to `evaluator`.
    ///
    /// The evaluator's target is replaced by the setting's `target_name`.
    pub fn new(mut evaluator: Evaluator, setting: OptimizationSetting) -> Result<Self, OptimizerError> {
        let parameter_sets = check_optimization_setting(&setting)?;
        analytics::StatisticsRecord::default().target(&setting.target_name)?;
        evaluator.registry().get(&evaluator.request().class_name)?;
        evaluator.request().parameters.validate()?;
        evaluator.set_target_name(&setting.target_name);

        Ok(Self {
            evaluator,
            setting,
            parameter_sets,
        })
    }

    pub fn setting(&self) -> &OptimizationSetting {
        &self.setting
    }

    pub fn parameter_sets(&self) -> &[SettingMap] {
        &self.parameter_sets
    }

    /// Runs the job and returns the evaluations, best first.
    pub fn run(&self, search: &dyn SearchStrategy) -> Result<Vec<EvaluationResult>, OptimizerError> {
        tracing::info!(
            search = search.name(),
            target = %self.setting.target_name,
            combinations = self.parameter_sets.len(),
            "Starting optimization"
        );

        let results = search.search(&self.evaluator, self.parameter_sets.clone())?;

        for result in &results {
            tracing::info!(
                "Parameters: {}, target: {}",
                serde_json::Value::Object(result.setting.clone()),
                result.target_value
            );
        }
        tracing::info!(evaluated = results.len(), "Optimization finished");

        Ok(results)
    }
}
