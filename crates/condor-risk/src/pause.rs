//! Pause control surface.
//!
//! File protocol (compatible with hand-edited files):
//! - pause file absent: running
//! - pause file empty, or holding a JSON `PauseRecord`: paused
//! - pause file holding a bare token: parsed with [`parse_pause_token`]
//! - emergency file present: paused, whatever the pause file says

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use condor_core::Clock;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::RiskResult;

// ============================================================================
// PauseState
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseState {
    #[default]
    Running,
    Paused,
}

impl PauseState {
    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }
}

impl fmt::Display for PauseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// Map an operator-supplied token to a pause state.
///
/// Unrecognized tokens resume trading and log a warning; they are never an
/// error.
#[must_use]
pub fn parse_pause_token(token: &str) -> PauseState {
    let normalized = token.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "pause" | "paused" | "stop" | "halt" | "on" | "true" | "1" | "yes" => PauseState::Paused,
        "resume" | "running" | "active" | "off" | "false" | "0" | "no" | "" => PauseState::Running,
        other => {
            warn!(token = other, "Unrecognized pause token, treating as resume");
            PauseState::Running
        }
    }
}

// ============================================================================
// PauseRecord
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PausedBy {
    Manual,
    Emergency,
}

/// Contents of the pause file written by `pause` and `emergency_stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseRecord {
    pub timestamp: NaiveDateTime,
    pub reason: String,
    pub paused_by: PausedBy,
}

impl PauseRecord {
    fn new(timestamp: NaiveDateTime, reason: &str, paused_by: PausedBy) -> Self {
        Self {
            timestamp,
            reason: reason.to_string(),
            paused_by,
        }
    }
}

// ============================================================================
// PauseSwitch
// ============================================================================

/// Source of the current pause state. Read once per tick.
pub trait PauseSwitch: Send + Sync {
    fn read(&self) -> PauseState;

    /// Operator-supplied reason for the current pause, if known.
    fn reason(&self) -> Option<String> {
        None
    }
}

impl<T: PauseSwitch + ?Sized> PauseSwitch for Arc<T> {
    fn read(&self) -> PauseState {
        (**self).read()
    }

    fn reason(&self) -> Option<String> {
        (**self).reason()
    }
}

/// Pause switch backed by marker files.
///
/// Records are stamped with `clock`, the same exchange-local clock the run
/// loop uses.
#[derive(Clone)]
pub struct FilePauseSwitch {
    pause_file: PathBuf,
    emergency_file: PathBuf,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for FilePauseSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePauseSwitch")
            .field("pause_file", &self.pause_file)
            .field("emergency_file", &self.emergency_file)
            .finish_non_exhaustive()
    }
}

impl FilePauseSwitch {
    pub fn new(
        pause_file: impl Into<PathBuf>,
        emergency_file: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pause_file: pause_file.into(),
            emergency_file: emergency_file.into(),
            clock,
        }
    }

    pub fn pause_file(&self) -> &Path {
        &self.pause_file
    }

    pub fn emergency_file(&self) -> &Path {
        &self.emergency_file
    }

    /// Pause trading, recording who and why.
    pub fn pause(&self, reason: &str) -> RiskResult<()> {
        self.write_record(&PauseRecord::new(self.clock.now(), reason, PausedBy::Manual))?;
        info!(reason, file = %self.pause_file.display(), "Trading paused");
        Ok(())
    }

    /// Resume trading. Resuming while not paused is a no-op.
    ///
    /// Does not clear an emergency stop; use `clear_emergency`.
    pub fn resume(&self) -> RiskResult<()> {
        if remove_if_exists(&self.pause_file)? {
            info!("Trading resumed");
        } else {
            warn!("Trading was not paused");
        }
        if self.emergency_file.exists() {
            warn!(
                file = %self.emergency_file.display(),
                "Emergency stop still active; trading stays paused"
            );
        }
        Ok(())
    }

    /// Pause with an emergency record and drop the emergency marker.
    pub fn emergency_stop(&self, reason: &str) -> RiskResult<()> {
        let record = PauseRecord::new(self.clock.now(), reason, PausedBy::Emergency);
        self.write_record(&record)?;
        fs::write(&self.emergency_file, serde_json::to_string_pretty(&record)?)?;
        error!(reason, "EMERGENCY STOP ACTIVATED");
        Ok(())
    }

    /// Remove both the emergency marker and the pause file.
    pub fn clear_emergency(&self) -> RiskResult<()> {
        let had_marker = remove_if_exists(&self.emergency_file)?;
        remove_if_exists(&self.pause_file)?;
        if had_marker {
            info!("Emergency stop cleared");
        } else {
            warn!("No emergency stop was active");
        }
        Ok(())
    }

    /// The record in the pause file, if there is a readable one.
    pub fn pause_record(&self) -> RiskResult<Option<PauseRecord>> {
        let Some(contents) = read_optional(&self.pause_file)? else {
            return Ok(None);
        };
        let trimmed = contents.trim();
        if !trimmed.starts_with('{') {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(trimmed)?))
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency_file.exists()
    }

    fn write_record(&self, record: &PauseRecord) -> RiskResult<()> {
        fs::write(&self.pause_file, serde_json::to_string_pretty(record)?)?;
        Ok(())
    }

    fn read_pause_file(&self) -> RiskResult<PauseState> {
        let Some(contents) = read_optional(&self.pause_file)? else {
            return Ok(PauseState::Running);
        };
        let trimmed = contents.trim();
        if trimmed.is_empty() || trimmed.starts_with('{') {
            return Ok(PauseState::Paused);
        }
        Ok(parse_pause_token(trimmed))
    }
}

impl PauseSwitch for FilePauseSwitch {
    fn read(&self) -> PauseState {
        if self.is_emergency() {
            return PauseState::Paused;
        }
        match self.read_pause_file() {
            Ok(state) => state,
            Err(e) => {
                // The file exists but cannot be read; its presence still means pause.
                warn!(error = %e, file = %self.pause_file.display(), "Unreadable pause file");
                PauseState::Paused
            }
        }
    }

    fn reason(&self) -> Option<String> {
        self.pause_record().ok().flatten().map(|record| record.reason)
    }
}

fn read_optional(path: &Path) -> RiskResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_if_exists(path: &Path) -> RiskResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
