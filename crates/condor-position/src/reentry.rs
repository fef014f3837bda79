//! Re-entry cooldown after a stop-out.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

fn default_cooldown_secs() -> u64 {
    300
}

/// Re-entry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReEntryConfig {
    /// Wait after a stop-out before re-entering. Default: 300 (5 minutes).
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Cap on re-entries per day. Unlimited when absent.
    #[serde(default)]
    pub max_reentries: Option<u32>,
}

impl Default for ReEntryConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            max_reentries: None,
        }
    }
}

impl ReEntryConfig {
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::seconds(i64::try_from(self.cooldown_secs).unwrap_or(i64::MAX / 1000))
    }

    /// Whether another re-entry is allowed after `taken` re-entries today.
    #[must_use]
    pub fn allows_another(&self, taken: u32) -> bool {
        self.max_reentries.map_or(true, |max| taken < max)
    }
}

/// Cooldown opened by a stop-out. Dropped on re-entry or when the day ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReEntryWindow {
    pub sl_hit_time: NaiveDateTime,
    pub cooldown: Duration,
    pub reentry_eligible_after: NaiveDateTime,
}

impl ReEntryWindow {
    #[must_use]
    pub fn new(sl_hit_time: NaiveDateTime, cooldown: Duration) -> Self {
        Self {
            sl_hit_time,
            cooldown,
            reentry_eligible_after: sl_hit_time + cooldown,
        }
    }

    /// True at or after `reentry_eligible_after`.
    #[must_use]
    pub fn is_eligible(&self, now: NaiveDateTime) -> bool {
        now >= self.reentry_eligible_after
    }

    /// Time left until eligible, zero once eligible.
    #[must_use]
    pub fn remaining(&self, now: NaiveDateTime) -> Duration {
        (self.reentry_eligible_after - now).max(Duration::zero())
    }
}
