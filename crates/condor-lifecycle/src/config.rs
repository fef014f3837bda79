//! Controller configuration.

use condor_core::{PriceBasis, SessionConfig};
use condor_position::{ReEntryConfig, TrailingStopConfig};
use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, LifecycleResult};

fn default_lot_size() -> u32 {
    65
}

fn default_quantity() -> u32 {
    1
}

fn default_buy_otm() -> u32 {
    5
}

fn default_sell_otm() -> u32 {
    3
}

/// Position shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Contract lot size. Default: 65.
    #[serde(default = "default_lot_size")]
    pub lot_size: u32,
    /// Lots per leg. Default: 1.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// OTM ordinal of the bought wings. Default: 5.
    #[serde(default = "default_buy_otm")]
    pub buy_otm: u32,
    /// OTM ordinal of the sold strikes. Default: 3.
    #[serde(default = "default_sell_otm")]
    pub sell_otm: u32,
    #[serde(default)]
    pub price_basis: PriceBasis,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            lot_size: default_lot_size(),
            quantity: default_quantity(),
            buy_otm: default_buy_otm(),
            sell_otm: default_sell_otm(),
            price_basis: PriceBasis::default(),
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> LifecycleResult<()> {
        if self.lot_size == 0 {
            return Err(LifecycleError::InvalidConfig("lot_size must be positive".to_string()));
        }
        if self.quantity == 0 {
            return Err(LifecycleError::InvalidConfig("quantity must be positive".to_string()));
        }
        if self.sell_otm == 0 {
            return Err(LifecycleError::InvalidConfig("sell_otm must be at least 1".to_string()));
        }
        if self.buy_otm <= self.sell_otm {
            return Err(LifecycleError::InvalidConfig(format!(
                "buy_otm ({}) must be further out than sell_otm ({})",
                self.buy_otm, self.sell_otm
            )));
        }
        Ok(())
    }
}

/// Everything the controller needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub trailing_stop: TrailingStopConfig,
    #[serde(default)]
    pub reentry: ReEntryConfig,
}

impl LifecycleConfig {
    pub fn validate(&self) -> LifecycleResult<()> {
        self.strategy.validate()?;
        self.session.validate()?;
        self.trailing_stop
            .validate()
            .map_err(|e| LifecycleError::InvalidConfig(e.to_string()))?;
        Ok(())
    }
}
