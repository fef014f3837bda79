//! Prometheus metrics and structured logging for condor.
//!
//! - Prometheus metrics for position P&L, stop level, lifecycle state, pause
//! - Structured JSON or pretty logging with tracing
//! - Daily statistics summary logged at end of day

pub mod daily_stats;
pub mod error;
pub mod logging;
pub mod metrics;

pub use daily_stats::DailyStats;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
