//! Lifecycle controller for the daily four-leg position.
//!
//! ```text
//! IDLE ──entry──▶ OPEN_MONITORING ──stop──▶ EXITED_COOLING ──re-entry──▶ OPEN_MONITORING
//!   │                   │                         │
//!   └───────────────────┴──forced exit / close────┴──────────▶ DONE ──next day──▶ IDLE
//! ```
//!
//! `tick` is a synchronous function of `(now, snapshot, pause)`; the run loop
//! owns timing, quote capture and the pause switch.

pub mod action;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;

pub use action::{Action, DoneReason, TickOutcome};
pub use config::{LifecycleConfig, StrategyConfig};
pub use controller::LifecycleController;
pub use error::{LifecycleError, LifecycleResult};
pub use state::LifecycleState;
