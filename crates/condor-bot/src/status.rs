//! Status file.
//!
//! A JSON snapshot of the controller, rewritten after every tick and read
//! back by the `status` subcommand.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use condor_core::Money;
use condor_feed::StrikeSelector;
use condor_lifecycle::{LifecycleController, LifecycleState};
use condor_position::Leg;
use condor_risk::PauseState;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionView {
    pub id: String,
    pub entry_time: Option<NaiveDateTime>,
    pub legs: Vec<Leg>,
    pub unrealized_pnl: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: LifecycleState,
    pub pause: PauseState,
    pub pause_reason: Option<String>,
    pub trading_date: NaiveDate,
    pub is_expiry_day: bool,
    pub position: Option<PositionView>,
    pub stop_level: Option<Money>,
    pub high_water_mark: Money,
    pub reentry_eligible_after: Option<NaiveDateTime>,
    pub entries_today: u32,
    pub reentries_today: u32,
    pub realized_pnl_today: Money,
    pub last_updated: NaiveDateTime,
}

impl StatusReport {
    pub fn from_controller<S: StrikeSelector>(
        controller: &LifecycleController<S>,
        pause: PauseState,
        pause_reason: Option<String>,
        now: NaiveDateTime,
    ) -> Self {
        let stats = controller.daily_stats();
        let context = controller.context();
        let stop = controller.stop_state();
        let position = controller.open_position().map(|p| PositionView {
            id: p.id.to_string(),
            entry_time: p.entry_time,
            legs: p.legs().to_vec(),
            unrealized_pnl: p.unrealized_pnl(),
        });

        Self {
            state: controller.state(),
            pause,
            pause_reason: pause_reason.filter(|_| pause.is_paused()),
            trading_date: context.date,
            is_expiry_day: context.is_expiry_day,
            // Stop fields only mean something while a position is open.
            stop_level: position.as_ref().and(stop.current_stop_level),
            high_water_mark: if position.is_some() {
                stop.high_water_mark
            } else {
                Money::ZERO
            },
            position,
            reentry_eligible_after: controller
                .reentry_window()
                .map(|w| w.reentry_eligible_after),
            entries_today: stats.entries,
            reentries_today: stats.reentries,
            realized_pnl_today: controller.ledger().realized_pnl(),
            last_updated: now,
        }
    }

    /// Unrealized P&L of the open position, zero when flat.
    #[must_use]
    pub fn unrealized_pnl(&self) -> Money {
        self.position
            .as_ref()
            .map_or(Money::ZERO, |p| p.unrealized_pnl)
    }

    /// Write via a temp file and rename so readers never see a torn file.
    pub fn write(&self, path: &Path) -> AppResult<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Read a status file; `None` if it does not exist.
    pub fn read(path: &Path) -> AppResult<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
