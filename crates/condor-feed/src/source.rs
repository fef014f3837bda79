//! Quote source trait.

use condor_core::{OptionQuote, OptionType, Price};

use crate::error::FeedResult;

/// Supplies current market data on demand.
///
/// Implementations must fail with `FeedError::QuoteUnavailable` when they
/// cannot answer; callers treat that as "skip this tick".
#[cfg_attr(test, mockall::automock)]
pub trait QuoteSource: Send + Sync {
    /// Current level of the underlying index.
    fn underlying_price(&self) -> FeedResult<Price>;

    /// Current quote for one option contract.
    fn option_quote(&self, strike: Price, option_type: OptionType) -> FeedResult<OptionQuote>;
}
