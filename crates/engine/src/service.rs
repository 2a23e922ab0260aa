use crate::error::EngineError;
use analytics::{ChartData, StatisticsRecord};
use backtester::{BacktestError, BacktestOutcome, Backtester, EngineFactory};
use configuration::{BacktestParameters, OptimizationSetting, SettingMap, StatisticsSettings};
use core_types::DailyResult;
use events::{BacktesterEvent, LogLevel};
use optimizer::{BruteForceSearch, EvaluationRequest, EvaluationResult, Evaluator, Optimizer};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use strategies::{builtin_classes, StrategyClass, StrategyRegistry};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// A single backtest of one strategy class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub class_name: String,
    pub parameters: BacktestParameters,
    #[serde(default)]
    pub setting: SettingMap,
}

/// A parameter sweep of one strategy class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub class_name: String,
    pub parameters: BacktestParameters,
    pub optimization: OptimizationSetting,
    /// Worker pool size; zero uses one worker per CPU.
    #[serde(default)]
    pub max_workers: usize,
}

#[derive(Default)]
struct TaskResults {
    outcome: Option<BacktestOutcome>,
    optimization: Vec<EvaluationResult>,
}

// State shared between the service handle and its worker thread.
struct Shared {
    factory: Arc<dyn EngineFactory>,
    statistics: StatisticsSettings,
    registry: RwLock<Arc<StrategyRegistry>>,
    running: AtomicBool,
    results: Mutex<TaskResults>,
    events: UnboundedSender<BacktesterEvent>,
}

impl Shared {
    fn write_log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
        self.emit(BacktesterEvent::log(level, message));
    }

    fn emit(&self, event: BacktesterEvent) {
        // A dropped receiver only means nobody is listening.
        if self.events.send(event).is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }

    fn registry(&self) -> Arc<StrategyRegistry> {
        self.registry.read().clone()
    }

    fn run_backtesting(&self, run_id: Uuid, request: BacktestRequest) {
        self.write_log(LogLevel::Info, format!("Backtesting started for {}", request.parameters.vt_symbol));

        let registry = self.registry();
        let outcome = registry
            .get(&request.class_name)
            .map_err(EngineError::from)
            .and_then(|class| {
                let mut backtester = Backtester::from_factory(self.factory.as_ref(), self.statistics);
                Ok(backtester.run(&request.parameters, class, &request.setting)?)
            });

        match outcome {
            Ok(outcome) => {
                outcome.statistics.log_summary();
                self.results.lock().outcome = Some(outcome);
                self.write_log(LogLevel::Info, "Backtesting finished");
                self.emit(BacktesterEvent::BacktestingFinished { run_id });
            }
            Err(EngineError::Backtest(BacktestError::DataUnavailable)) => {
                self.write_log(LogLevel::Warn, "No history data available, backtesting stopped");
            }
            Err(e) => {
                self.write_log(LogLevel::Error, format!("Backtesting failed: {e}"));
            }
        }
    }

    fn run_optimization(&self, run_id: Uuid, request: OptimizationRequest) {
        self.write_log(
            LogLevel::Info,
            format!("Optimization started, target: {}", request.optimization.target_name),
        );

        let evaluator = Evaluator::new(
            EvaluationRequest {
                target_name: request.optimization.target_name.clone(),
                class_name: request.class_name,
                parameters: request.parameters,
                statistics: self.statistics,
            },
            self.factory.clone(),
            self.registry(),
        );
        let search = BruteForceSearch::new(request.max_workers);
        let results = Optimizer::new(evaluator, request.optimization).and_then(|optimizer| optimizer.run(&search));

        match results {
            Ok(results) => {
                self.results.lock().optimization = results;
                self.write_log(LogLevel::Info, "Optimization finished");
                self.emit(BacktesterEvent::OptimizationFinished { run_id });
            }
            Err(e) => {
                self.write_log(LogLevel::Error, format!("Optimization failed: {e}"));
            }
        }
    }
}

/// Runs backtests and optimizations in the background, one task at a time.
///
/// Progress and completion are reported on the event channel returned by `new`;
/// results are fetched with the `get_result_*` methods once the matching finished
/// event arrives.
pub struct BacktesterEngine {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BacktesterEngine {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        statistics: StatisticsSettings,
        registry: StrategyRegistry,
    ) -> (Self, UnboundedReceiver<BacktesterEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            factory,
            statistics,
            registry: RwLock::new(Arc::new(registry)),
            running: AtomicBool::new(false),
            results: Mutex::new(TaskResults::default()),
            events,
        });
        (
            Self {
                shared,
                worker: Mutex::new(None),
            },
            receiver,
        )
    }

    /// Loads the built-in strategy classes.
    pub fn init_engine(&self) {
        self.write_log("Initialising backtesting engine");
        let loaded = self.reload_strategy_class(builtin_classes());
        self.write_log(format!("Strategy classes loaded: {loaded}"));
    }

    /// Replaces the loaded strategy classes and returns how many were accepted.
    ///
    /// A task already running keeps the classes it started with.
    pub fn reload_strategy_class(&self, classes: impl IntoIterator<Item = StrategyClass>) -> usize {
        let mut registry = StrategyRegistry::new();
        let loaded = registry.reload(classes);
        *self.shared.registry.write() = Arc::new(registry);
        loaded
    }

    pub fn get_strategy_class_names(&self) -> Vec<String> {
        self.shared.registry().class_names()
    }

    pub fn get_default_setting(&self, class_name: &str) -> Result<SettingMap, EngineError> {
        Ok(self.shared.registry().default_setting(class_name)?)
    }

    pub fn write_log(&self, message: impl Into<String>) {
        self.shared.write_log(LogLevel::Info, message);
    }

    /// Starts a backtest in the background. Returns `false` if a task is already running.
    pub fn start_backtesting(&self, request: BacktestRequest) -> bool {
        self.spawn_task("ctabench-backtest", move |shared, run_id| {
            shared.run_backtesting(run_id, request)
        })
    }

    /// Starts an optimization in the background. Returns `false` if a task is already running.
    pub fn start_optimization(&self, request: OptimizationRequest) -> bool {
        self.spawn_task("ctabench-optimization", move |shared, run_id| {
            shared.run_optimization(run_id, request)
        })
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Blocks until the current task, if any, has finished.
    pub fn join(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
    }

    pub fn get_result_statistics(&self) -> Option<StatisticsRecord> {
        self.shared
            .results
            .lock()
            .outcome
            .as_ref()
            .map(|outcome| outcome.statistics.clone())
    }

    pub fn get_result_daily_results(&self) -> Vec<DailyResult> {
        self.shared
            .results
            .lock()
            .outcome
            .as_ref()
            .map(|outcome| outcome.daily_results.clone())
            .unwrap_or_default()
    }

    pub fn get_result_chart(&self) -> Option<ChartData> {
        self.shared.results.lock().outcome.as_ref().map(BacktestOutcome::chart)
    }

    /// Optimization results of the last sweep, best first.
    pub fn get_result_values(&self) -> Vec<EvaluationResult> {
        self.shared.results.lock().optimization.clone()
    }

    fn spawn_task<F>(&self, thread_name: &str, task: F) -> bool
    where
        F: FnOnce(&Shared, Uuid) + Send + 'static,
    {
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.shared
                .write_log(LogLevel::Warn, "A task is already running, please wait for it to finish");
            return false;
        }

        *self.shared.results.lock() = TaskResults::default();

        let run_id = Uuid::new_v4();
        let shared = self.shared.clone();
        let spawned = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| task(&shared, run_id)));
                if let Err(payload) = outcome {
                    shared.write_log(
                        LogLevel::Error,
                        format!("Task panicked: {}", panic_message(payload.as_ref())),
                    );
                }
                shared.running.store(false, Ordering::SeqCst);
            })
            .map_err(EngineError::from);

        match spawned {
            Ok(handle) => {
                // The previous worker has cleared the gate, so it is finished or about to be.
                let previous = self.worker.lock().replace(handle);
                if let Some(previous) = previous {
                    if previous.join().is_err() {
                        tracing::error!("Previous worker thread panicked");
                    }
                }
                true
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::SeqCst);
                self.shared.write_log(LogLevel::Error, format!("{e}"));
                false
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown cause"
    }
}

impl Drop for BacktesterEngine {
    fn drop(&mut self) {
        self.join();
    }
}
