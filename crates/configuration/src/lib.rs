//! # CTA Configuration
//!
//! Everything the workspace reads from disk or the environment:
//!
//! - `AppConfig`: application settings layered from an optional file and `CTA_*`
//!   environment variables with the `config` crate.
//! - `json_store`: flat JSON settings files (`load_json` / `save_json`) that never
//!   fail to load.
//! - `BacktestParameters` and `OptimizationSetting`: the plain records handed to the
//!   backtester and the optimizer.
//! - `logging::init_tracing`: the tracing subscriber used by the binary.

use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod json_store;
pub mod logging;
pub mod optimizer_config;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use json_store::{get_file_path, load_json, save_json, SettingMap};
pub use logging::init_tracing;
pub use optimizer_config::{load_optimization_setting, OptimizationSetting, ParameterRange};
pub use settings::{AppConfig, BacktestParameters, LoggingConfig, StatisticsSettings};

/// Prefix of environment variables that override file settings,
/// e.g. `CTA_STATISTICS__ANNUAL_DAYS=252`.
pub const ENV_PREFIX: &str = "CTA";

/// Loads the application configuration.
///
/// The file at `path` (TOML or JSON, by extension) is required when given. Environment
/// variables are layered on top, and every section falls back to its defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let config = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<AppConfig>()?;

    config.validate()?;
    Ok(config)
}
