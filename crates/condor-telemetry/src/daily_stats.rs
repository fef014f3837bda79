//! Daily statistics for one trading day.
//!
//! Accumulates entry/exit counts and realized P&L while the day runs and
//! logs a single summary line when the day ends.

use chrono::NaiveDate;
use condor_core::Money;
use serde::Serialize;
use tracing::info;

/// Per-day trading summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub entries: u32,
    pub reentries: u32,
    pub stop_loss_exits: u32,
    pub forced_exits: u32,
    pub session_end_exits: u32,
    pub shutdown_exits: u32,
    pub realized_pnl: Money,
    /// Best unrealized P&L seen across all positions of the day.
    pub max_high_water_mark: Money,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            entries: 0,
            reentries: 0,
            stop_loss_exits: 0,
            forced_exits: 0,
            session_end_exits: 0,
            shutdown_exits: 0,
            realized_pnl: Money::ZERO,
            max_high_water_mark: Money::ZERO,
        }
    }

    /// Record an entry. Re-entries also count as entries.
    pub fn record_entry(&mut self, is_reentry: bool) {
        self.entries += 1;
        if is_reentry {
            self.reentries += 1;
        }
    }

    /// Record an exit by reason label and its realized P&L.
    pub fn record_exit(&mut self, reason: &str, realized: Money) {
        match reason {
            "stop_loss" => self.stop_loss_exits += 1,
            "forced_expiry_exit" => self.forced_exits += 1,
            "session_end" => self.session_end_exits += 1,
            "shutdown" => self.shutdown_exits += 1,
            _ => {}
        }
        self.realized_pnl += realized;
    }

    pub fn observe_high_water(&mut self, high_water_mark: Money) {
        self.max_high_water_mark = self.max_high_water_mark.max(high_water_mark);
    }

    /// Total exits of any kind.
    pub fn exits(&self) -> u32 {
        self.stop_loss_exits + self.forced_exits + self.session_end_exits + self.shutdown_exits
    }

    /// Log the summary.
    pub fn report(&self) {
        info!(
            date = %self.date,
            entries = self.entries,
            reentries = self.reentries,
            stop_loss_exits = self.stop_loss_exits,
            forced_exits = self.forced_exits,
            session_end_exits = self.session_end_exits,
            shutdown_exits = self.shutdown_exits,
            realized_pnl = %self.realized_pnl,
            max_high_water_mark = %self.max_high_water_mark,
            "Daily summary"
        );
    }
}
