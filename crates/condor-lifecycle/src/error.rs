//! Lifecycle error types.

use condor_core::CoreError;
use condor_position::PositionError;
use thiserror::Error;

/// Errors that escape a tick. Missing quotes never do; they become
/// `Action::Skipped`.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ledger error: {0}")]
    Position(#[from] PositionError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid lifecycle state: {0}")]
    InvalidState(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
