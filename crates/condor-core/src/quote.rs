//! Option quote data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Price;

/// Which quote field counts as the tradable price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBasis {
    /// Last traded price.
    #[default]
    Last,
    /// Midpoint of bid and ask.
    Mid,
}

/// Quote for a single option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub bid: Price,
    pub ask: Price,
    pub last: Price,
}

impl OptionQuote {
    pub fn new(bid: Price, ask: Price, last: Price) -> Self {
        Self { bid, ask, last }
    }

    /// Midpoint of bid and ask.
    pub fn mid(&self) -> Price {
        Price::new((self.bid.inner() + self.ask.inner()) / Decimal::TWO)
    }

    /// Tradable price under the given basis.
    ///
    /// Returns `None` when that price is zero or negative; such a quote
    /// cannot be traded against.
    pub fn tradable_price(&self, basis: PriceBasis) -> Option<Price> {
        let price = match basis {
            PriceBasis::Last => self.last,
            PriceBasis::Mid => self.mid(),
        };
        price.is_positive().then_some(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(bid: Decimal, ask: Decimal, last: Decimal) -> OptionQuote {
        OptionQuote::new(Price::new(bid), Price::new(ask), Price::new(last))
    }

    #[test]
    fn test_tradable_price_last() {
        let q = quote(dec!(41.5), dec!(42.5), dec!(42.1));
        assert_eq!(q.tradable_price(PriceBasis::Last), Some(Price::new(dec!(42.1))));
    }

    #[test]
    fn test_tradable_price_mid() {
        let q = quote(dec!(41.5), dec!(42.5), dec!(42.1));
        assert_eq!(q.tradable_price(PriceBasis::Mid), Some(Price::new(dec!(42))));
    }

    #[test]
    fn test_zero_price_is_not_tradable() {
        let q = quote(dec!(0), dec!(0.1), dec!(0));
        assert_eq!(q.tradable_price(PriceBasis::Last), None);
        assert!(q.tradable_price(PriceBasis::Mid).is_some());
    }
}
