//! Risk control error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Control file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Control file encoding failed: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type RiskResult<T> = Result<T, RiskError>;
