use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid statistics settings: {0}")]
    InvalidSettings(String),

    #[error("Unknown statistic '{0}'")]
    UnknownMetric(String),
}
