use crate::error::OptimizerError;
use crate::evaluate::{get_target_value, EvaluationResult, Evaluator};
use configuration::SettingMap;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

/// A way of exploring a parameter grid.
///
/// Implementations return the evaluations they ran, best first.
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn search(
        &self,
        evaluator: &Evaluator,
        parameter_sets: Vec<SettingMap>,
    ) -> Result<Vec<EvaluationResult>, OptimizerError>;
}

/// Evaluates every parameter set of the grid in parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceSearch {
    /// Size of the worker pool; zero uses one worker per CPU.
    pub max_workers: usize,
}

impl BruteForceSearch {
    pub fn new(max_workers: usize) -> Self {
        Self { max_workers }
    }

    pub fn worker_count(&self) -> usize {
        if self.max_workers == 0 {
            num_cpus::get()
        } else {
            self.max_workers
        }
    }
}

impl SearchStrategy for BruteForceSearch {
    fn name(&self) -> &str {
        "brute_force"
    }

    fn search(
        &self,
        evaluator: &Evaluator,
        parameter_sets: Vec<SettingMap>,
    ) -> Result<Vec<EvaluationResult>, OptimizerError> {
        let workers = self.worker_count();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;

        tracing::info!(
            runs = parameter_sets.len(),
            workers,
            "Starting brute-force optimization"
        );

        let progress_bar = ProgressBar::new(parameter_sets.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );

        let mut results: Vec<EvaluationResult> = pool.install(|| {
            parameter_sets
                .par_iter()
                .filter_map(|setting| {
                    let result = evaluator.evaluate(setting);
                    progress_bar.inc(1);
                    match result {
                        Ok(result) => Some(result),
                        Err(e) => {
                            tracing::error!(setting = ?setting, error = %e, "Evaluation failed, skipping");
                            None
                        }
                    }
                })
                .collect()
        });

        progress_bar.finish_with_message("Optimization runs complete.");

        results.sort_by(|a, b| get_target_value(b).total_cmp(&get_target_value(a)));
        Ok(results)
    }
}
