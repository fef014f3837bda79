//! Trailing profit stop.
//!
//! The stop does not exist until the position's best P&L (high-water mark)
//! reaches `activation_threshold`. It then arms at `HWM - initial_buffer`
//! and only ever moves up while the position stays open. It triggers when
//! live P&L falls to or below the stop level.
//!
//! Two trail rules are supported:
//!
//! - `Stepped`: `(activation - buffer) + increment * floor((HWM - activation) / increment)`.
//!   The stop moves up in whole increments of additional profit.
//! - `Continuous`: `HWM - buffer`, tracking every new high exactly.

use condor_core::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PositionError, PositionResult};

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailMode {
    #[default]
    Stepped,
    Continuous,
}

fn default_activation_threshold() -> Decimal {
    Decimal::from(300)
}

fn default_initial_buffer() -> Decimal {
    Decimal::from(50)
}

fn default_trail_increment() -> Decimal {
    Decimal::ONE
}

/// Trailing stop parameters, all in currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingStopConfig {
    /// P&L that arms the stop. Default: 300.
    #[serde(default = "default_activation_threshold")]
    pub activation_threshold: Decimal,
    /// Distance kept below the high-water mark. Default: 50.
    #[serde(default = "default_initial_buffer")]
    pub initial_buffer: Decimal,
    /// Granularity of stop moves. Default: 1.
    #[serde(default = "default_trail_increment")]
    pub trail_increment: Decimal,
    #[serde(default)]
    pub mode: TrailMode,
}

impl Default for TrailingStopConfig {
    fn default() -> Self {
        Self {
            activation_threshold: default_activation_threshold(),
            initial_buffer: default_initial_buffer(),
            trail_increment: default_trail_increment(),
            mode: TrailMode::default(),
        }
    }
}

impl TrailingStopConfig {
    pub fn validate(&self) -> PositionResult<()> {
        if self.activation_threshold <= Decimal::ZERO {
            return Err(PositionError::InvalidConfig(format!(
                "activation_threshold must be positive, got {}",
                self.activation_threshold
            )));
        }
        if self.initial_buffer < Decimal::ZERO {
            return Err(PositionError::InvalidConfig(format!(
                "initial_buffer must not be negative, got {}",
                self.initial_buffer
            )));
        }
        if self.trail_increment <= Decimal::ZERO {
            return Err(PositionError::InvalidConfig(format!(
                "trail_increment must be positive, got {}",
                self.trail_increment
            )));
        }
        Ok(())
    }
}

// ============================================================================
// State
// ============================================================================

/// Per-position stop state. A fresh state is used for every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrailingStopState {
    pub high_water_mark: Money,
    /// `None` until armed.
    pub current_stop_level: Option<Money>,
}

impl TrailingStopState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.current_stop_level.is_some()
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopEvaluation {
    pub state: TrailingStopState,
    pub triggered: bool,
    /// The stop armed on this evaluation.
    pub armed_now: bool,
    /// The stop moved up on this evaluation (not set on arming).
    pub raised: bool,
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingStopEngine {
    config: TrailingStopConfig,
}

impl TrailingStopEngine {
    #[must_use]
    pub fn new(config: TrailingStopConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrailingStopConfig {
        &self.config
    }

    /// Feed one P&L observation through the stop.
    #[must_use]
    pub fn evaluate(&self, pnl: Money, state: TrailingStopState) -> StopEvaluation {
        let high_water_mark = state.high_water_mark.max(pnl);
        let buffer = Money::new(self.config.initial_buffer);
        let mut armed_now = false;

        let mut stop = state.current_stop_level;
        if stop.is_none() && high_water_mark.inner() >= self.config.activation_threshold {
            stop = Some(high_water_mark - buffer);
            armed_now = true;
            info!(
                high_water_mark = %high_water_mark,
                stop_level = %(high_water_mark - buffer),
                "Trailing stop armed"
            );
        }

        let mut raised = false;
        if let Some(level) = stop {
            let candidate = self.candidate_stop(high_water_mark);
            if candidate > level {
                stop = Some(candidate);
                raised = !armed_now;
                if raised {
                    debug!(from = %level, to = %candidate, "Trailing stop raised");
                }
            }
        }

        let triggered = stop.is_some_and(|level| pnl <= level);
        StopEvaluation {
            state: TrailingStopState {
                high_water_mark,
                current_stop_level: stop,
            },
            triggered,
            armed_now,
            raised,
        }
    }

    fn candidate_stop(&self, high_water_mark: Money) -> Money {
        let TrailingStopConfig {
            activation_threshold,
            initial_buffer,
            trail_increment,
            mode,
        } = self.config;

        match mode {
            TrailMode::Continuous => Money::new(high_water_mark.inner() - initial_buffer),
            TrailMode::Stepped => {
                let beyond = (high_water_mark.inner() - activation_threshold).max(Decimal::ZERO);
                let steps = (beyond / trail_increment).floor();
                Money::new(activation_threshold - initial_buffer + trail_increment * steps)
            }
        }
    }
}
