//! In-process pause latch.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::info;

use crate::pause::{PauseState, PauseSwitch};

/// Atomic pause switch, shareable via `Arc<PauseLatch>`.
///
/// Unlike a hard stop this toggles both ways; the most recent reason is
/// kept for status reporting.
#[derive(Debug, Default)]
pub struct PauseLatch {
    paused: AtomicBool,
    reason: RwLock<Option<String>>,
}

impl PauseLatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self, reason: &str) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            info!(reason, "Pause latch set");
        }
        *self.reason.write() = Some(reason.to_string());
    }

    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            info!("Pause latch cleared");
        }
        *self.reason.write() = None;
    }

    /// Apply a parsed state, e.g. from a control message.
    pub fn set(&self, state: PauseState) {
        match state {
            PauseState::Paused => self.pause("external"),
            PauseState::Running => self.resume(),
        }
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }
}

impl PauseSwitch for PauseLatch {
    fn read(&self) -> PauseState {
        if self.is_paused() {
            PauseState::Paused
        } else {
            PauseState::Running
        }
    }

    fn reason(&self) -> Option<String> {
        PauseLatch::reason(self)
    }
}
