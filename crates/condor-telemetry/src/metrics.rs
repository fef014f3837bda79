//! Prometheus metrics for the condor bot.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, which is a fatal programming error that
//! should crash at first use rather than fail silently.

use condor_core::Money;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_histogram, CounterVec,
    Encoder, Gauge, GaugeVec, Histogram, TextEncoder,
};
use rust_decimal::prelude::ToPrimitive;

use crate::error::TelemetryResult;

/// Lifecycle states exported as one-hot gauge labels.
const LIFECYCLE_STATES: [&str; 4] = ["idle", "open_monitoring", "exited_cooling", "done"];

/// Live mark-to-market P&L of the open position (0 when flat).
pub static POSITION_PNL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("condor_position_pnl", "Unrealized P&L of the open position").unwrap()
});

/// Realized P&L for the current trading day.
pub static REALIZED_PNL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("condor_realized_pnl", "Realized P&L for the current day").unwrap()
});

/// Current trailing stop level (only meaningful while armed).
pub static STOP_LEVEL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("condor_stop_level", "Current trailing stop level").unwrap()
});

/// Whether the trailing stop is armed (1 = armed).
pub static STOP_ARMED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("condor_stop_armed", "Trailing stop armed (1=armed)").unwrap()
});

/// Lifecycle controller state (1 = active).
pub static LIFECYCLE_STATE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "condor_lifecycle_state",
        "Lifecycle controller state (1=active, 0=inactive)",
        &["state"]
    )
    .unwrap()
});

/// Pause switch (1 = paused).
pub static PAUSED: Lazy<Gauge> =
    Lazy::new(|| register_gauge!("condor_paused", "Pause switch state (1=paused)").unwrap());

/// Positions opened.
pub static ENTRIES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "condor_entries_total",
        "Total positions opened",
        &["kind"]
    )
    .unwrap()
});

/// Positions closed.
pub static EXITS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("condor_exits_total", "Total positions closed", &["reason"]).unwrap()
});

/// Ticks that made no decision.
pub static TICKS_SKIPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "condor_ticks_skipped_total",
        "Ticks skipped without a decision",
        &["reason"]
    )
    .unwrap()
});

/// Run loop steps that failed outside the controller.
pub static RUN_LOOP_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "condor_run_loop_errors_total",
        "Non-fatal run loop failures",
        &["stage"]
    )
    .unwrap()
});

/// Wall time spent in one run loop tick (quote capture + controller).
pub static TICK_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "condor_tick_duration_ms",
        "Run loop tick duration in milliseconds",
        vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 500.0]
    )
    .unwrap()
});

fn as_f64(value: Money) -> f64 {
    value.inner().to_f64().unwrap_or(0.0)
}

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record live P&L.
    pub fn position_pnl(pnl: Money) {
        POSITION_PNL.set(as_f64(pnl));
    }

    /// Record realized P&L for the day.
    pub fn realized_pnl(pnl: Money) {
        REALIZED_PNL.set(as_f64(pnl));
    }

    /// Record the trailing stop level, or `None` while unarmed.
    pub fn stop_level(level: Option<Money>) {
        match level {
            Some(level) => {
                STOP_ARMED.set(1.0);
                STOP_LEVEL.set(as_f64(level));
            }
            None => {
                STOP_ARMED.set(0.0);
                STOP_LEVEL.set(0.0);
            }
        }
    }

    /// Set the active lifecycle state; all other states are zeroed.
    pub fn lifecycle_state(state: &str) {
        for s in LIFECYCLE_STATES {
            LIFECYCLE_STATE.with_label_values(&[s]).set(0.0);
        }
        LIFECYCLE_STATE.with_label_values(&[state]).set(1.0);
    }

    /// Record pause switch state.
    pub fn paused(is_paused: bool) {
        PAUSED.set(if is_paused { 1.0 } else { 0.0 });
    }

    /// Record a position entry.
    pub fn entry(is_reentry: bool) {
        let kind = if is_reentry { "reentry" } else { "initial" };
        ENTRIES_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a position exit.
    pub fn exit(reason: &str) {
        EXITS_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record a skipped tick.
    pub fn tick_skipped(reason: &str) {
        TICKS_SKIPPED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record a non-fatal run loop failure, e.g. `status_write`.
    pub fn run_loop_error(stage: &str) {
        RUN_LOOP_ERRORS_TOTAL.with_label_values(&[stage]).inc();
    }

    /// Record tick duration.
    pub fn tick_duration(duration_ms: f64) {
        TICK_DURATION_MS.observe(duration_ms);
    }

    /// Encode all registered metrics in Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
