use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Defines an optimization job: the statistic to maximise and the parameter space
/// to sweep. Usually deserialized from an `optimization.toml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSetting {
    /// Name of the statistic used as the ranking key (e.g. `sharpe_ratio`).
    pub target_name: String,
    /// Ordered by name so the generated grid is deterministic.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterRange>,
}

impl OptimizationSetting {
    pub fn new(target_name: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds a parameter to the sweep, replacing any previous range under that name.
    pub fn add_parameter(&mut self, name: impl Into<String>, range: ParameterRange) -> &mut Self {
        self.parameters.insert(name.into(), range);
        self
    }
}

/// Represents the values a single parameter takes during a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterRange {
    // Listed before `Linear`: a three-element list must not be read as a range.
    Discrete(Vec<Value>),
    /// `start`, `start + step`, ... up to and including `end`.
    Linear { start: f64, end: f64, step: f64 },
    Fixed(Value),
}

/// Loads an optimization job from a TOML or JSON file.
pub fn load_optimization_setting(path: &Path) -> Result<OptimizationSetting, ConfigError> {
    let setting = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?
        .try_deserialize::<OptimizationSetting>()?;
    Ok(setting)
}
