//! Deterministic synthetic quotes for paper trading.
//!
//! The underlying follows a sine wave around `base_underlying`; option
//! premiums are intrinsic value plus a time value that decays with
//! distance from the underlying.

use std::f64::consts::PI;

use condor_core::{OptionQuote, OptionType, Price};
use parking_lot::RwLock;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{FeedError, FeedResult};
use crate::source::QuoteSource;

/// Smallest premium the synthetic feed quotes (one NSE tick).
const MIN_PREMIUM: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

fn default_base_underlying() -> Decimal {
    Decimal::from(20000)
}

fn default_amplitude() -> Decimal {
    Decimal::from(150)
}

fn default_period_secs() -> u64 {
    3600
}

fn default_time_value() -> Decimal {
    Decimal::from(120)
}

fn default_time_value_decay() -> Decimal {
    Decimal::from(200)
}

fn default_spread() -> Decimal {
    Decimal::new(5, 1) // 0.5
}

/// Synthetic feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticFeedConfig {
    #[serde(default = "default_base_underlying")]
    pub base_underlying: Decimal,
    /// Peak distance of the underlying from its base.
    #[serde(default = "default_amplitude")]
    pub amplitude: Decimal,
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
    /// Time value of an at-the-money option.
    #[serde(default = "default_time_value")]
    pub time_value: Decimal,
    /// Distance over which time value falls by a factor of e.
    #[serde(default = "default_time_value_decay")]
    pub time_value_decay: Decimal,
    /// Bid/ask width around the quoted premium.
    #[serde(default = "default_spread")]
    pub spread: Decimal,
}

impl Default for SyntheticFeedConfig {
    fn default() -> Self {
        Self {
            base_underlying: default_base_underlying(),
            amplitude: default_amplitude(),
            period_secs: default_period_secs(),
            time_value: default_time_value(),
            time_value_decay: default_time_value_decay(),
            spread: default_spread(),
        }
    }
}

/// `QuoteSource` backed by a closed-form price model.
pub struct SyntheticQuoteSource {
    config: SyntheticFeedConfig,
    underlying: RwLock<Price>,
}

impl SyntheticQuoteSource {
    pub fn new(config: SyntheticFeedConfig) -> Self {
        let underlying = RwLock::new(Price::new(config.base_underlying));
        Self { config, underlying }
    }

    pub fn config(&self) -> &SyntheticFeedConfig {
        &self.config
    }

    /// Move the underlying to its level `elapsed_secs` into the run.
    pub fn advance(&self, elapsed_secs: f64) -> FeedResult<Price> {
        let period = self.config.period_secs.max(1) as f64;
        let phase = (2.0 * PI * elapsed_secs / period).sin();
        let wave = Decimal::from_f64(phase)
            .ok_or_else(|| FeedError::QuoteUnavailable(format!("bad phase {phase}")))?;
        let level = (self.config.base_underlying + self.config.amplitude * wave).round_dp(2);

        let price = Price::new(level);
        *self.underlying.write() = price;
        trace!(elapsed_secs, underlying = %price, "Synthetic underlying advanced");
        Ok(price)
    }

    /// Pin the underlying, bypassing the wave.
    pub fn set_underlying(&self, price: Price) {
        *self.underlying.write() = price;
    }

    fn premium(&self, underlying: Decimal, strike: Decimal, option_type: OptionType) -> FeedResult<Decimal> {
        let intrinsic = match option_type {
            OptionType::Call => (underlying - strike).max(Decimal::ZERO),
            OptionType::Put => (strike - underlying).max(Decimal::ZERO),
        };

        let distance = (strike - underlying).abs().to_f64().unwrap_or(f64::MAX);
        let decay = self.config.time_value_decay.to_f64().unwrap_or(1.0).max(f64::EPSILON);
        let factor = Decimal::from_f64((-distance / decay).exp()).ok_or_else(|| {
            FeedError::QuoteUnavailable(format!("bad time value factor at {strike}"))
        })?;

        let premium = (intrinsic + self.config.time_value * factor).round_dp(2);
        Ok(premium.max(MIN_PREMIUM))
    }
}

impl QuoteSource for SyntheticQuoteSource {
    fn underlying_price(&self) -> FeedResult<Price> {
        Ok(*self.underlying.read())
    }

    fn option_quote(&self, strike: Price, option_type: OptionType) -> FeedResult<OptionQuote> {
        if !strike.is_positive() {
            return Err(FeedError::QuoteUnavailable(format!(
                "no contract at strike {strike}"
            )));
        }
        let underlying = self.underlying.read().inner();
        let last = self.premium(underlying, strike.inner(), option_type)?;
        let half_spread = self.config.spread / Decimal::TWO;

        Ok(OptionQuote::new(
            Price::new((last - half_spread).max(MIN_PREMIUM)),
            Price::new(last + half_spread),
            Price::new(last),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn source() -> SyntheticQuoteSource {
        SyntheticQuoteSource::new(SyntheticFeedConfig::default())
    }

    #[test]
    fn test_starts_at_base() {
        assert_eq!(source().underlying_price().unwrap(), Price::new(dec!(20000)));
    }

    #[test]
    fn test_advance_quarter_period_hits_peak() {
        let src = source();
        let price = src.advance(900.0).unwrap();
        assert_eq!(price, Price::new(dec!(20150)));
        assert_eq!(src.underlying_price().unwrap(), price);
    }

    #[test]
    fn test_atm_premium_is_time_value() {
        let q = source()
            .option_quote(Price::new(dec!(20000)), OptionType::Call)
            .unwrap();
        assert_eq!(q.last, Price::new(dec!(120)));
        assert_eq!(q.bid, Price::new(dec!(119.75)));
        assert_eq!(q.ask, Price::new(dec!(120.25)));
    }

    #[test]
    fn test_otm_cheaper_than_nearer_strike() {
        let src = source();
        let near = src.option_quote(Price::new(dec!(20150)), OptionType::Call).unwrap();
        let far = src.option_quote(Price::new(dec!(20250)), OptionType::Call).unwrap();
        assert!(far.last < near.last);
        assert!(far.last.is_positive());
    }

    #[test]
    fn test_itm_put_includes_intrinsic() {
        let src = source();
        src.set_underlying(Price::new(dec!(19800)));
        let q = src.option_quote(Price::new(dec!(19900)), OptionType::Put).unwrap();
        assert!(q.last.inner() > dec!(100));
    }

    #[test]
    fn test_far_strike_floors_at_min_premium() {
        let q = source()
            .option_quote(Price::new(dec!(25000)), OptionType::Call)
            .unwrap();
        assert_eq!(q.last, Price::new(dec!(0.05)));
        assert_eq!(q.bid, Price::new(dec!(0.05)));
    }

    #[test]
    fn test_non_positive_strike_unavailable() {
        assert!(source().option_quote(Price::ZERO, OptionType::Put).is_err());
    }
}
