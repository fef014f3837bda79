//! What a tick did.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use condor_core::{Money, PaperOrderId};
use condor_feed::StrikeSet;
use condor_position::ClosedPosition;
use serde::Serialize;

use crate::state::LifecycleState;

/// Why the day ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoneReason {
    NonTradingDay,
    /// Entry never happened before the forced exit or session close.
    EntryWindowClosed,
    ForcedExit,
    SessionEnd,
    ReEntryLimit,
    /// Re-derived strikes no longer fit the strategy shape.
    StrategyInvalidated,
}

impl DoneReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonTradingDay => "non_trading_day",
            Self::EntryWindowClosed => "entry_window_closed",
            Self::ForcedExit => "forced_exit",
            Self::SessionEnd => "session_end",
            Self::ReEntryLimit => "reentry_limit",
            Self::StrategyInvalidated => "strategy_invalidated",
        }
    }
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decision made during a tick, in the order it was made.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Entered {
        position_id: PaperOrderId,
        strikes: StrikeSet,
        reentry: bool,
    },
    StopArmed {
        level: Money,
        high_water_mark: Money,
    },
    StopRaised {
        level: Money,
        high_water_mark: Money,
    },
    Exited {
        closed: ClosedPosition,
    },
    CooldownStarted {
        eligible_after: NaiveDateTime,
    },
    /// An entry or re-entry was due but the pause switch is on.
    EntrySuppressed,
    /// The tick could not be evaluated; state is unchanged.
    Skipped {
        reason: String,
    },
    DayDone {
        reason: DoneReason,
    },
    DayReset {
        date: NaiveDate,
    },
}

/// Result of one `tick`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickOutcome {
    pub state: LifecycleState,
    pub actions: Vec<Action>,
}

impl TickOutcome {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.actions.is_empty()
    }

    /// Positions closed during this tick.
    pub fn exits(&self) -> impl Iterator<Item = &ClosedPosition> {
        self.actions.iter().filter_map(|a| match a {
            Action::Exited { closed } => Some(closed),
            _ => None,
        })
    }

    /// Entries made during this tick, `true` for re-entries.
    pub fn entries(&self) -> impl Iterator<Item = bool> + '_ {
        self.actions.iter().filter_map(|a| match a {
            Action::Entered { reentry, .. } => Some(*reentry),
            _ => None,
        })
    }
}
