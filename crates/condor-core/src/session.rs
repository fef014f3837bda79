//! Trading day calendar.
//!
//! Derives the per-day facts the lifecycle controller needs:
//! - Whether the date is a trading day (Monday to Friday)
//! - Whether the date is the monthly expiry (last Tuesday of the month)
//! - Entry cut-off, expiry forced-exit time and session close
//!
//! All times are exchange-local wall clock times (IST by default).

use std::sync::Arc;

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

fn default_entry_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 20, 0).expect("09:20:00 is a valid time")
}

fn default_forced_exit_time() -> NaiveTime {
    NaiveTime::from_hms_opt(14, 0, 0).expect("14:00:00 is a valid time")
}

fn default_session_close() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 30, 0).expect("15:30:00 is a valid time")
}

fn default_utc_offset_minutes() -> i32 {
    330 // IST
}

/// Session timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Earliest time a position may be entered. Default: 09:20.
    #[serde(default = "default_entry_time")]
    pub entry_time: NaiveTime,
    /// Forced exit time on expiry day. Default: 14:00.
    #[serde(default = "default_forced_exit_time")]
    pub forced_exit_time: NaiveTime,
    /// Intraday square-off time; nothing stays open past it. Default: 15:30.
    #[serde(default = "default_session_close")]
    pub session_close: NaiveTime,
    /// Exchange offset from UTC in minutes. Default: 330 (IST).
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            entry_time: default_entry_time(),
            forced_exit_time: default_forced_exit_time(),
            session_close: default_session_close(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl SessionConfig {
    /// Check that `entry_time < forced_exit_time <= session_close`.
    pub fn validate(&self) -> Result<()> {
        if self.entry_time >= self.forced_exit_time {
            return Err(CoreError::InvalidSessionTime(format!(
                "entry_time {} must be before forced_exit_time {}",
                self.entry_time, self.forced_exit_time
            )));
        }
        if self.forced_exit_time > self.session_close {
            return Err(CoreError::InvalidSessionTime(format!(
                "forced_exit_time {} must not be after session_close {}",
                self.forced_exit_time, self.session_close
            )));
        }
        if FixedOffset::east_opt(self.utc_offset_minutes * 60).is_none() {
            return Err(CoreError::InvalidSessionTime(format!(
                "utc_offset_minutes {} out of range",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }
}

/// Check whether `date` is the last Tuesday of its month.
#[must_use]
pub fn is_last_tuesday_of_month(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Tue && (date + Duration::days(7)).month() != date.month()
}

/// Calendar facts for one trading day.
///
/// Derived once per date and never mutated; the controller builds a fresh
/// one when the date rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingDayContext {
    pub date: NaiveDate,
    pub is_trading_day: bool,
    pub is_expiry_day: bool,
    pub entry_time: NaiveTime,
    /// Only set on expiry day.
    pub forced_exit_time: Option<NaiveTime>,
    pub session_close: NaiveTime,
}

impl TradingDayContext {
    /// Derive the context for `date`.
    #[must_use]
    pub fn derive(date: NaiveDate, config: &SessionConfig) -> Self {
        let is_trading_day = !matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let is_expiry_day = is_last_tuesday_of_month(date);
        Self {
            date,
            is_trading_day,
            is_expiry_day,
            entry_time: config.entry_time,
            forced_exit_time: is_expiry_day.then_some(config.forced_exit_time),
            session_close: config.session_close,
        }
    }

    /// Entry cut-off has passed.
    #[must_use]
    pub fn entry_open(&self, now: NaiveDateTime) -> bool {
        now.time() >= self.entry_time
    }

    /// Expiry day and at or past the forced exit time.
    #[must_use]
    pub fn forced_exit_due(&self, now: NaiveDateTime) -> bool {
        self.forced_exit_time
            .is_some_and(|exit_time| now.time() >= exit_time)
    }

    /// At or past session close.
    #[must_use]
    pub fn session_over(&self, now: NaiveDateTime) -> bool {
        now.time() >= self.session_close
    }

    /// Whether `now` belongs to a later date than this context.
    #[must_use]
    pub fn is_stale(&self, now: NaiveDateTime) -> bool {
        now.date() != self.date
    }
}

/// Source of the current exchange-local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Wall clock shifted to the exchange's UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(utc_offset_minutes: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            CoreError::InvalidSessionTime(format!(
                "utc_offset_minutes {utc_offset_minutes} out of range"
            ))
        })?;
        Ok(Self { offset })
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}
