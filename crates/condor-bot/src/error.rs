//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] condor_core::CoreError),

    #[error("Feed error: {0}")]
    Feed(#[from] condor_feed::FeedError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] condor_lifecycle::LifecycleError),

    #[error("Control error: {0}")]
    Risk(#[from] condor_risk::RiskError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] condor_telemetry::TelemetryError),

    #[error("Status encoding error: {0}")]
    Status(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
