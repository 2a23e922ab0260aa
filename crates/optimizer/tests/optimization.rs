use backtester::{BacktestError, BacktestingEngine, EngineFactory};
use chrono::{Duration, NaiveDate};
use configuration::{BacktestParameters, OptimizationSetting, ParameterRange, SettingMap, StatisticsSettings};
use core_types::{DailyResult, EngineType, Interval, OrderId};
use optimizer::{
    evaluate, BruteForceSearch, EvaluationRequest, EvaluationResult, Evaluator, Optimizer,
    OptimizerError, SearchStrategy,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strategies::{OrderGateway, OrderRequest, Strategy, StrategyClass, StrategyRegistry};

struct NullGateway;

impl OrderGateway for NullGateway {
    fn send_order(&self, _strategy_name: &str, _request: &OrderRequest) -> Vec<OrderId> {
        Vec::new()
    }
    fn cancel_order(&self, _strategy_name: &str, _orderid: &OrderId) {}
    fn cancel_all(&self, _strategy_name: &str) {}
    fn engine_type(&self) -> EngineType {
        EngineType::Backtesting
    }
    fn pricetick(&self, _strategy_name: &str) -> f64 {
        1.0
    }
    fn size(&self, _strategy_name: &str) -> f64 {
        1.0
    }
}

/// Earns `fast_window * fixed_size` per day, so the best setting is known in advance.
#[derive(Default)]
struct WindowEngine {
    parameters: Option<BacktestParameters>,
    strategy: Option<Box<dyn Strategy>>,
    results: Vec<DailyResult>,
}

impl BacktestingEngine for WindowEngine {
    fn set_parameters(&mut self, parameters: &BacktestParameters) -> Result<(), BacktestError> {
        self.parameters = Some(parameters.clone());
        Ok(())
    }

    fn add_strategy(&mut self, class: &StrategyClass, setting: &SettingMap) -> Result<(), BacktestError> {
        let vt_symbol = self
            .parameters
            .as_ref()
            .map(|p| p.vt_symbol.clone())
            .unwrap_or_default();
        self.strategy = Some(class.instantiate("window", &vt_symbol, Arc::new(NullGateway), setting)?);
        Ok(())
    }

    fn load_data(&mut self) -> Result<(), BacktestError> {
        Ok(())
    }

    fn has_history_data(&self) -> bool {
        true
    }

    fn run_backtesting(&mut self) -> Result<(), BacktestError> {
        let (Some(parameters), Some(strategy)) = (&self.parameters, &self.strategy) else {
            return Err(BacktestError::Engine("not configured".to_string()));
        };
        let daily = (strategy.parameters().get_i64("fast_window")?
            * strategy.parameters().get_i64("fixed_size")?) as f64;
        self.results = (0..10)
            .map(|i| DailyResult::with_pnl(parameters.start + Duration::days(i), daily))
            .collect();
        Ok(())
    }

    fn daily_results(&mut self) -> Result<Vec<DailyResult>, BacktestError> {
        Ok(self.results.clone())
    }

    fn clear_data(&mut self) {
        *self = Self::default();
    }
}

fn request(target_name: &str) -> EvaluationRequest {
    EvaluationRequest {
        target_name: target_name.to_string(),
        class_name: "DoubleMaStrategy".to_string(),
        parameters: BacktestParameters {
            vt_symbol: "rb2405.SHFE".to_string(),
            interval: Interval::Daily,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            rate: 0.0,
            slippage: 0.0,
            size: 10.0,
            pricetick: 1.0,
            capital: 100_000.0,
            mode: None,
        },
        statistics: StatisticsSettings::default(),
    }
}

fn factory() -> Arc<dyn EngineFactory> {
    Arc::new(|| -> Box<dyn BacktestingEngine> { Box::new(WindowEngine::default()) })
}

fn evaluator(target_name: &str) -> Evaluator {
    Evaluator::new(
        request(target_name),
        factory(),
        Arc::new(StrategyRegistry::with_builtin()),
    )
}

fn window_setting() -> OptimizationSetting {
    let mut setting = OptimizationSetting::new("total_net_pnl");
    setting
        .add_parameter("fast_window", ParameterRange::Linear { start: 5.0, end: 25.0, step: 5.0 })
        .add_parameter("slow_window", ParameterRange::Fixed(json!(20)))
        .add_parameter("fixed_size", ParameterRange::Discrete(vec![json!(1), json!(2)]));
    setting
}

#[test]
fn evaluate_scores_a_single_setting() {
    let registry = StrategyRegistry::with_builtin();
    let mut setting = SettingMap::new();
    setting.insert("fast_window".to_string(), json!(7));

    let result = evaluate(&request("total_net_pnl"), &setting, factory().as_ref(), &registry).unwrap();

    assert_eq!(result.target_value, 70.0);
    assert_eq!(result.setting, setting);
    assert_eq!(result.statistics.total_days, 10);
}

#[test]
fn evaluate_reports_an_unknown_class() {
    let mut request = request("total_net_pnl");
    request.class_name = "Missing".to_string();
    let result = evaluate(&request, &SettingMap::new(), factory().as_ref(), &StrategyRegistry::with_builtin());
    assert!(matches!(result, Err(OptimizerError::Strategy(_))));
}

#[test]
fn brute_force_ranks_best_first_and_skips_failures() {
    let optimizer = Optimizer::new(evaluator("sharpe_ratio"), window_setting()).unwrap();
    assert_eq!(optimizer.parameter_sets().len(), 10);

    let results = optimizer.run(&BruteForceSearch::new(4)).unwrap();

    // fast_window 20 and 25 are not below slow_window 20 and fail to construct.
    assert_eq!(results.len(), 6);
    let targets: Vec<f64> = results.iter().map(|r| r.target_value).collect();
    assert_eq!(targets, vec![300.0, 200.0, 150.0, 100.0, 100.0, 50.0]);
    assert_eq!(results[0].setting["fast_window"], json!(15));
    assert_eq!(results[0].setting["fixed_size"], json!(2));
}

#[test]
fn optimizer_rejects_unknown_targets_and_empty_grids() {
    let mut unknown_target = window_setting();
    unknown_target.target_name = "alpha".to_string();
    assert!(matches!(
        Optimizer::new(evaluator("total_net_pnl"), unknown_target),
        Err(OptimizerError::Analytics(_))
    ));

    assert!(matches!(
        Optimizer::new(evaluator("total_net_pnl"), OptimizationSetting::new("total_net_pnl")),
        Err(OptimizerError::ParameterGeneration(_))
    ));
}

/// Evaluates only the first parameter set.
struct FirstOnly {
    calls: AtomicUsize,
}

impl SearchStrategy for FirstOnly {
    fn name(&self) -> &str {
        "first_only"
    }

    fn search(
        &self,
        evaluator: &Evaluator,
        parameter_sets: Vec<SettingMap>,
    ) -> Result<Vec<EvaluationResult>, OptimizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        parameter_sets
            .first()
            .map(|setting| evaluator.evaluate(setting))
            .into_iter()
            .collect()
    }
}

#[test]
fn custom_search_strategies_plug_in() {
    let optimizer = Optimizer::new(evaluator("total_net_pnl"), window_setting()).unwrap();
    let search = FirstOnly { calls: AtomicUsize::new(0) };

    let results = optimizer.run(&search).unwrap();

    assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].setting["fast_window"], json!(5));
    assert_eq!(results[0].setting["fixed_size"], json!(1));
}
