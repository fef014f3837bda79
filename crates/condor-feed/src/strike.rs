//! Out-of-the-money strike selection.

use condor_core::{LegRole, OptionType, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FeedError, FeedResult};

/// Maps an underlying level to the Nth out-of-the-money strike.
///
/// Must be deterministic: identical inputs always give the same strike.
pub trait StrikeSelector: Send + Sync {
    fn select_otm_strike(
        &self,
        underlying: Price,
        option_type: OptionType,
        n: u32,
    ) -> FeedResult<Price>;
}

fn default_strike_step() -> Decimal {
    Decimal::from(50)
}

/// Strike ladder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeLadderConfig {
    /// Distance between listed strikes. Default: 50.
    #[serde(default = "default_strike_step")]
    pub strike_step: Decimal,
}

impl Default for StrikeLadderConfig {
    fn default() -> Self {
        Self {
            strike_step: default_strike_step(),
        }
    }
}

/// Fixed-step strike ladder.
///
/// ATM is the underlying rounded to the nearest step. The Nth OTM call is
/// `ATM + N * step`, the Nth OTM put is `ATM - N * step`.
#[derive(Debug, Clone, Copy)]
pub struct StrikeLadder {
    step: Price,
}

impl StrikeLadder {
    #[must_use]
    pub fn new(step: Price) -> Self {
        Self { step }
    }

    #[must_use]
    pub fn from_config(config: &StrikeLadderConfig) -> Self {
        Self::new(Price::new(config.strike_step))
    }

    #[must_use]
    pub fn step(&self) -> Price {
        self.step
    }

    #[must_use]
    pub fn atm(&self, underlying: Price) -> Price {
        underlying.round_to_step(self.step)
    }
}

impl Default for StrikeLadder {
    fn default() -> Self {
        Self::from_config(&StrikeLadderConfig::default())
    }
}

impl StrikeSelector for StrikeLadder {
    fn select_otm_strike(
        &self,
        underlying: Price,
        option_type: OptionType,
        n: u32,
    ) -> FeedResult<Price> {
        if n == 0 {
            return Err(FeedError::StrikeSelectionFailure(
                "OTM ordinal must be at least 1".to_string(),
            ));
        }
        if !self.step.is_positive() {
            return Err(FeedError::StrikeSelectionFailure(format!(
                "strike step must be positive, got {}",
                self.step
            )));
        }
        if !underlying.is_positive() {
            return Err(FeedError::StrikeSelectionFailure(format!(
                "underlying must be positive, got {underlying}"
            )));
        }

        let atm = self.atm(underlying);
        let offset = self.step * Decimal::from(n);
        let strike = match option_type {
            OptionType::Call => atm + offset,
            OptionType::Put => atm - offset,
        };

        if !strike.is_positive() {
            return Err(FeedError::StrikeSelectionFailure(format!(
                "{n} OTM {option_type} strike below zero at underlying {underlying}"
            )));
        }
        Ok(strike)
    }
}

/// The four strikes of one entry, indexed by `LegRole`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeSet {
    strikes: [Price; 4],
}

impl StrikeSet {
    /// Select all four strikes at the given underlying level.
    pub fn select(
        selector: &dyn StrikeSelector,
        underlying: Price,
        buy_otm: u32,
        sell_otm: u32,
    ) -> FeedResult<Self> {
        let mut strikes = [Price::ZERO; 4];
        for role in LegRole::ALL {
            strikes[role.index()] = selector.select_otm_strike(
                underlying,
                role.option_type(),
                role.otm_ordinal(buy_otm, sell_otm),
            )?;
        }
        let set = Self { strikes };
        debug!(
            underlying = %underlying,
            buy_call = %set.strike(LegRole::BuyCall),
            sell_call = %set.strike(LegRole::SellCall),
            buy_put = %set.strike(LegRole::BuyPut),
            sell_put = %set.strike(LegRole::SellPut),
            "Selected strikes"
        );
        Ok(set)
    }

    #[must_use]
    pub fn from_strikes(strikes: [Price; 4]) -> Self {
        Self { strikes }
    }

    #[must_use]
    pub fn strike(&self, role: LegRole) -> Price {
        self.strikes[role.index()]
    }

    /// `(strike, option_type)` keys for all four legs in role order.
    pub fn keys(&self) -> impl Iterator<Item = (Price, OptionType)> + '_ {
        LegRole::ALL
            .into_iter()
            .map(|role| (self.strike(role), role.option_type()))
    }

    /// Check the strategy shape against the underlying.
    ///
    /// Calls sit above and puts below the underlying, and the bought wings
    /// sit strictly outside the sold strikes.
    pub fn validate(&self, underlying: Price) -> FeedResult<()> {
        let buy_call = self.strike(LegRole::BuyCall);
        let sell_call = self.strike(LegRole::SellCall);
        let buy_put = self.strike(LegRole::BuyPut);
        let sell_put = self.strike(LegRole::SellPut);

        let violation = if sell_call <= underlying {
            Some(format!("short call {sell_call} not above underlying {underlying}"))
        } else if sell_put >= underlying {
            Some(format!("short put {sell_put} not below underlying {underlying}"))
        } else if buy_call <= sell_call {
            Some(format!("call wing {buy_call} not outside short call {sell_call}"))
        } else if buy_put >= sell_put {
            Some(format!("put wing {buy_put} not outside short put {sell_put}"))
        } else {
            None
        };

        match violation {
            Some(reason) => Err(FeedError::StrikeSelectionFailure(reason)),
            None => Ok(()),
        }
    }
}
