use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    #[error("Failed to write settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode settings as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
