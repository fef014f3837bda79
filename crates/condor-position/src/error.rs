//! Position error types.

use condor_feed::FeedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    /// Entry attempted before the entry time or while a position is open.
    #[error("Invalid entry window: {0}")]
    InvalidEntryWindow(String),

    #[error("No open position")]
    NoOpenPosition,

    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("Invalid position state: {0}")]
    InvalidState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<FeedError> for PositionError {
    fn from(err: FeedError) -> Self {
        // Strike selection failures are transient for the ledger as well.
        match err {
            FeedError::QuoteUnavailable(msg) | FeedError::StrikeSelectionFailure(msg) => {
                Self::QuoteUnavailable(msg)
            }
        }
    }
}

pub type PositionResult<T> = Result<T, PositionError>;
