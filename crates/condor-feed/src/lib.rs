//! Market data seams for condor.
//!
//! # Key Components
//!
//! - [`QuoteSource`]: Supplies the underlying level and per-strike option quotes
//! - [`StrikeSelector`]: Maps underlying level to the Nth out-of-the-money strike
//! - [`StrikeLadder`]: Fixed-step strike selector (NIFTY-style 50 point ladder)
//! - [`StrikeSet`]: The four strikes of one entry, validated against strategy rules
//! - [`MarketSnapshot`]: One consistent quote snapshot for a single tick
//! - [`SyntheticQuoteSource`]: Deterministic paper-trading quote source

pub mod error;
pub mod snapshot;
pub mod source;
pub mod strike;
pub mod synthetic;

pub use error::{FeedError, FeedResult};
pub use snapshot::{capture_snapshot, MarketSnapshot};
pub use source::QuoteSource;
pub use strike::{StrikeLadder, StrikeLadderConfig, StrikeSelector, StrikeSet};
pub use synthetic::{SyntheticFeedConfig, SyntheticQuoteSource};
