//! Core domain types for the condor options paper-trading bot.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Price`, `Money`: Precision-safe decimal types for premiums and P&L
//! - `OptionType`, `LegSide`, `LegRole`: The four-leg strategy vocabulary
//! - `OptionQuote`, `PriceBasis`: Quote data and the tradable-price rule
//! - `TradingDayContext`: Per-day calendar facts (expiry day, cut-off times)

pub mod decimal;
pub mod error;
pub mod option;
pub mod quote;
pub mod session;

pub use decimal::{Money, Price};
pub use error::{CoreError, Result};
pub use option::{LegRole, LegSide, OptionType, PaperOrderId};
pub use quote::{OptionQuote, PriceBasis};
pub use session::{
    is_last_tuesday_of_month, Clock, SessionConfig, SystemClock, TradingDayContext,
};
