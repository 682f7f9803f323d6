//! Error type shared by the simulator.

use thiserror::Error;

/// Errors which abort simulation setup or log output.
///
/// Strategy evaluation never produces an error: a degenerate decision (zero loads, no eligible destination)
/// simply results in no migration for the current step.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("can't parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("can't write results: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    pub(crate) fn invalid<S: Into<String>>(message: S) -> Self {
        SimulationError::InvalidConfiguration(message.into())
    }
}
