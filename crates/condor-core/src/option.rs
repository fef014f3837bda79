//! Option contract vocabulary and leg identifiers.
//!
//! Provides option type, leg side, the four fixed leg roles of the strategy,
//! and paper order IDs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Option type: call (CE) or put (PE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "CE"),
            Self::Put => write!(f, "PE"),
        }
    }
}

/// Leg side: bought or sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegSide {
    Buy,
    Sell,
}

impl LegSide {
    /// Returns the opposite side (the side that closes this leg).
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns 1 for buy, -1 for sell (for P&L calculations).
    pub fn sign(&self) -> Decimal {
        match self {
            Self::Buy => Decimal::ONE,
            Self::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl fmt::Display for LegSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// The four legs of the strategy, in entry order.
///
/// The bought legs are the far wings (5th OTM by default), the sold legs
/// are the nearer strikes (3rd OTM by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegRole {
    BuyCall,
    SellCall,
    BuyPut,
    SellPut,
}

impl LegRole {
    /// All roles in the order legs are entered.
    pub const ALL: [LegRole; 4] = [
        LegRole::BuyCall,
        LegRole::SellCall,
        LegRole::BuyPut,
        LegRole::SellPut,
    ];

    pub fn option_type(&self) -> OptionType {
        match self {
            Self::BuyCall | Self::SellCall => OptionType::Call,
            Self::BuyPut | Self::SellPut => OptionType::Put,
        }
    }

    pub fn side(&self) -> LegSide {
        match self {
            Self::BuyCall | Self::BuyPut => LegSide::Buy,
            Self::SellCall | Self::SellPut => LegSide::Sell,
        }
    }

    /// Index into a `[_; 4]` leg array.
    pub fn index(&self) -> usize {
        match self {
            Self::BuyCall => 0,
            Self::SellCall => 1,
            Self::BuyPut => 2,
            Self::SellPut => 3,
        }
    }

    /// OTM ordinal for this role given the wing and short ordinals.
    pub fn otm_ordinal(&self, buy_otm: u32, sell_otm: u32) -> u32 {
        match self.side() {
            LegSide::Buy => buy_otm,
            LegSide::Sell => sell_otm,
        }
    }
}

impl fmt::Display for LegRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.side(), self.option_type())
    }
}

/// Identifier for a simulated (paper) position.
///
/// Format: `paper_{timestamp_ms}_{uuid_short}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaperOrderId(String);

impl PaperOrderId {
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("paper_{ts}_{uuid_short}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PaperOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaperOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
