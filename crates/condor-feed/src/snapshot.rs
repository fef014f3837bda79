//! Per-tick market snapshots.
//!
//! The controller never talks to a `QuoteSource` directly. The run loop
//! captures one `MarketSnapshot` per tick so every decision in that tick
//! sees the same prices.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use condor_core::{LegRole, OptionQuote, OptionType, Price, PriceBasis};
use tracing::{debug, warn};

use crate::error::{FeedError, FeedResult};
use crate::source::QuoteSource;
use crate::strike::{StrikeSelector, StrikeSet};

/// Underlying level plus the option quotes relevant to this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub underlying: Price,
    pub captured_at: NaiveDateTime,
    quotes: HashMap<(Price, OptionType), OptionQuote>,
}

impl MarketSnapshot {
    pub fn new(underlying: Price, captured_at: NaiveDateTime) -> Self {
        Self {
            underlying,
            captured_at,
            quotes: HashMap::new(),
        }
    }

    /// Builder-style insert, mainly for tests and replay.
    #[must_use]
    pub fn with_quote(mut self, strike: Price, option_type: OptionType, quote: OptionQuote) -> Self {
        self.insert(strike, option_type, quote);
        self
    }

    pub fn insert(&mut self, strike: Price, option_type: OptionType, quote: OptionQuote) {
        self.quotes.insert((strike, option_type), quote);
    }

    pub fn quote(&self, strike: Price, option_type: OptionType) -> Option<&OptionQuote> {
        self.quotes.get(&(strike, option_type))
    }

    /// Tradable price for one contract, `None` if missing or non-positive.
    pub fn tradable_price(
        &self,
        strike: Price,
        option_type: OptionType,
        basis: PriceBasis,
    ) -> Option<Price> {
        self.quote(strike, option_type)
            .and_then(|q| q.tradable_price(basis))
    }

    /// Tradable prices for all four legs of a strike set, in role order.
    ///
    /// Fails with `QuoteUnavailable` naming the first leg without a price.
    pub fn leg_prices(&self, strikes: &StrikeSet, basis: PriceBasis) -> FeedResult<[Price; 4]> {
        let mut prices = [Price::ZERO; 4];
        for role in LegRole::ALL {
            let strike = strikes.strike(role);
            prices[role.index()] = self
                .tradable_price(strike, role.option_type(), basis)
                .ok_or_else(|| {
                    FeedError::QuoteUnavailable(format!("{role} {strike} has no tradable price"))
                })?;
        }
        Ok(prices)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Capture one snapshot from `source`.
///
/// Quotes are fetched for the entry candidates at the current underlying
/// level plus every contract in `held`. A failed underlying read fails the
/// whole capture; a failed option read is logged and left out so the
/// controller can decide what a missing quote means for its state.
pub fn capture_snapshot(
    source: &dyn QuoteSource,
    selector: &dyn StrikeSelector,
    buy_otm: u32,
    sell_otm: u32,
    held: &[(Price, OptionType)],
    now: NaiveDateTime,
) -> FeedResult<MarketSnapshot> {
    let underlying = source.underlying_price()?;
    if !underlying.is_positive() {
        return Err(FeedError::QuoteUnavailable(format!(
            "non-positive underlying {underlying}"
        )));
    }

    let mut snapshot = MarketSnapshot::new(underlying, now);

    let mut wanted: Vec<(Price, OptionType)> = held.to_vec();
    match StrikeSet::select(selector, underlying, buy_otm, sell_otm) {
        Ok(candidates) => wanted.extend(candidates.keys()),
        Err(e) => warn!(error = %e, "No entry candidates for snapshot"),
    }

    for (strike, option_type) in wanted {
        if snapshot.quote(strike, option_type).is_some() {
            continue;
        }
        match source.option_quote(strike, option_type) {
            Ok(quote) => snapshot.insert(strike, option_type, quote),
            Err(e) => warn!(strike = %strike, %option_type, error = %e, "Option quote unavailable"),
        }
    }

    debug!(underlying = %underlying, quotes = snapshot.len(), "Captured market snapshot");
    Ok(snapshot)
}
