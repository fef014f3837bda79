//! Feed error types.

use thiserror::Error;

/// Both variants are transient: the tick that hit them is skipped.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("Strike selection failed: {0}")]
    StrikeSelectionFailure(String),
}

pub type FeedResult<T> = Result<T, FeedError>;
