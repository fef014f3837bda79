//! Condor paper-trading bot.
//!
//! Wires the lifecycle controller to its collaborators:
//! - Synthetic quote feed and strike ladder
//! - Pause switch read fresh every tick
//! - Status file and `/metrics` + `/status` HTTP endpoint
//! - Polling run loop with ctrl-c shutdown

pub mod app;
pub mod config;
pub mod error;
pub mod server;
pub mod status;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use status::StatusReport;
