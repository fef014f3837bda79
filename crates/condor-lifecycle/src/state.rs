//! Lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No position opened yet today.
    Idle,
    /// Position live, stop not triggered.
    OpenMonitoring,
    /// Stopped out, waiting for the re-entry window.
    ExitedCooling,
    /// Nothing more happens until the next trading day.
    Done,
}

impl LifecycleState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::OpenMonitoring => "open_monitoring",
            Self::ExitedCooling => "exited_cooling",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
