//! Error types for the ad-app service layer.

use std::path::PathBuf;

/// Unified error for the CLI; backend errors are flattened to messages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Failed to read {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Substrate error: {0}")]
    Substrate(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    /// The run stopped early; its prefix is stored under `run_id`.
    #[error("Run {run_id} diverged at step {index} (t = {time_days} d): {reason}")]
    Diverged {
        run_id: String,
        index: usize,
        time_days: f64,
        reason: String,
    },

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<ad_scenario::ScenarioError> for AppError {
    fn from(err: ad_scenario::ScenarioError) -> Self {
        match err {
            ad_scenario::ScenarioError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Scenario(other.to_string()),
        }
    }
}

impl From<ad_substrates::SubstrateError> for AppError {
    fn from(err: ad_substrates::SubstrateError) -> Self {
        AppError::Substrate(err.to_string())
    }
}

impl From<ad_feed::FeedError> for AppError {
    fn from(err: ad_feed::FeedError) -> Self {
        AppError::Feed(err.to_string())
    }
}

impl From<ad_sim::SimError> for AppError {
    fn from(err: ad_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<ad_results::ResultsError> for AppError {
    fn from(err: ad_results::ResultsError) -> Self {
        match err {
            ad_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

impl From<ad_core::AdError> for AppError {
    fn from(err: ad_core::AdError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
