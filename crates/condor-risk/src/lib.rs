//! Operator controls for condor.
//!
//! A pause blocks new entries and re-entries but never blocks closing an
//! open position. The controller itself never reads a switch: the run loop
//! reads one fresh every tick and passes the resulting [`PauseState`] in.
//!
//! # Key Components
//!
//! - [`PauseSwitch`]: Anything that can report the current pause state
//! - [`FilePauseSwitch`]: Pause and emergency marker files on disk
//! - [`PauseLatch`]: In-process atomic switch
//! - [`parse_pause_token`]: Lenient mapping from operator text to [`PauseState`]

pub mod error;
pub mod latch;
pub mod pause;

pub use error::{RiskError, RiskResult};
pub use latch::PauseLatch;
pub use pause::{
    parse_pause_token, FilePauseSwitch, PauseRecord, PauseState, PauseSwitch, PausedBy,
};
