use crate::error::OptimizerError;
use analytics::StatisticsRecord;
use backtester::{Backtester, EngineFactory};
use configuration::{BacktestParameters, SettingMap, StatisticsSettings};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strategies::StrategyRegistry;

/// Everything a worker needs to score one parameter set, as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Statistic used as the ranking key.
    pub target_name: String,
    pub class_name: String,
    pub parameters: BacktestParameters,
    #[serde(default)]
    pub statistics: StatisticsSettings,
}

/// One scored parameter set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub setting: SettingMap,
    pub target_value: f64,
    pub statistics: StatisticsRecord,
}

/// Runs one backtest on a fresh engine and scores it.
///
/// Builds its own engine through `factory` and shares nothing mutable with other
/// calls, so any number of threads may call it at once.
pub fn evaluate(
    request: &EvaluationRequest,
    setting: &SettingMap,
    factory: &dyn EngineFactory,
    registry: &StrategyRegistry,
) -> Result<EvaluationResult, OptimizerError> {
    let class = registry.get(&request.class_name)?;
    let mut backtester = Backtester::from_factory(factory, request.statistics);
    let outcome = backtester.run(&request.parameters, class, setting)?;
    let target_value = outcome.statistics.target(&request.target_name)?;

    Ok(EvaluationResult {
        setting: setting.clone(),
        target_value,
        statistics: outcome.statistics,
    })
}

/// The sort key of an evaluation.
pub fn get_target_value(result: &EvaluationResult) -> f64 {
    result.target_value
}

/// `evaluate` with its request, engine factory and strategy registry bound.
#[derive(Clone)]
pub struct Evaluator {
    request: EvaluationRequest,
    factory: Arc<dyn EngineFactory>,
    registry: Arc<StrategyRegistry>,
}

impl Evaluator {
    pub fn new(
        request: EvaluationRequest,
        factory: Arc<dyn EngineFactory>,
        registry: Arc<StrategyRegistry>,
    ) -> Self {
        Self { request, factory, registry }
    }

    pub fn request(&self) -> &EvaluationRequest {
        &self.request
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub(crate) fn set_target_name(&mut self, target_name: &str) {
        self.request.target_name = target_name.to_string();
    }

    pub fn evaluate(&self, setting: &SettingMap) -> Result<EvaluationResult, OptimizerError> {
        evaluate(&self.request, setting, self.factory.as_ref(), &self.registry)
    }
}
