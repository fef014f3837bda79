//! Paper position management for condor.
//!
//! Holds the day's four-leg position, computes mark-to-market P&L, trails a
//! profit stop and times re-entry after a stop-out. Everything here is
//! synchronous and in-memory; no order ever leaves the process.
//!
//! # Key Components
//!
//! - [`PositionLedger`]: Opens, marks and closes the single paper position
//! - [`Position`] / [`Leg`]: The four-leg combination and its legs
//! - [`TrailingStopEngine`]: Arms and trails the profit stop, reports triggers
//! - [`ReEntryWindow`]: Cooldown between a stop-out and the next entry

pub mod error;
pub mod ledger;
pub mod reentry;
pub mod trailing_stop;

pub use error::{PositionError, PositionResult};
pub use ledger::{CloseReason, ClosedPosition, Leg, Position, PositionLedger, PositionStatus};
pub use reentry::{ReEntryConfig, ReEntryWindow};
pub use trailing_stop::{
    StopEvaluation, TrailMode, TrailingStopConfig, TrailingStopEngine, TrailingStopState,
};
