//! Application configuration.

use std::path::{Path, PathBuf};

use condor_core::SessionConfig;
use condor_feed::{StrikeLadderConfig, SyntheticFeedConfig};
use condor_lifecycle::{LifecycleConfig, StrategyConfig};
use condor_position::{ReEntryConfig, TrailingStopConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};

/// Env var naming the config file when `--config` is not given.
pub const CONFIG_ENV: &str = "CONDOR_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

// ============================================================================
// Sections
// ============================================================================

fn default_pause_file() -> PathBuf {
    PathBuf::from("trading_pause.txt")
}

fn default_emergency_file() -> PathBuf {
    PathBuf::from("EMERGENCY_STOP.txt")
}

fn default_status_file() -> PathBuf {
    PathBuf::from("trading_status.json")
}

/// Operator control files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    #[serde(default = "default_pause_file")]
    pub pause_file: PathBuf,
    #[serde(default = "default_emergency_file")]
    pub emergency_file: PathBuf,
    /// Rewritten after every tick.
    #[serde(default = "default_status_file")]
    pub status_file: PathBuf,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            pause_file: default_pause_file(),
            emergency_file: default_emergency_file(),
            status_file: default_status_file(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLoopConfig {
    /// Time between ticks (ms). Default: 1,000.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for RunLoopConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Port for `/metrics` and `/status`. 0 disables the server.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    /// Default log level; `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: default_metrics_port(),
            log_level: default_log_level(),
        }
    }
}

// ============================================================================
// AppConfig
// ============================================================================

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub trailing_stop: TrailingStopConfig,
    #[serde(default)]
    pub reentry: ReEntryConfig,
    #[serde(default)]
    pub strikes: StrikeLadderConfig,
    #[serde(default)]
    pub feed: SyntheticFeedConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub run_loop: RunLoopConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Resolve and load the config file.
    ///
    /// Order: `explicit` path, then `CONDOR_CONFIG`, then
    /// `config/default.toml`. Only a missing default file falls back to
    /// built-in defaults; a missing explicit or env path is an error.
    pub fn load(explicit: Option<&str>) -> AppResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            warn!(path = DEFAULT_CONFIG_PATH, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load and validate a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Controller view of the config.
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            strategy: self.strategy,
            session: self.session,
            trailing_stop: self.trailing_stop,
            reentry: self.reentry,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        self.lifecycle()
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if self.strikes.strike_step <= Decimal::ZERO {
            return Err(AppError::Config(format!(
                "strikes.strike_step must be positive, got {}",
                self.strikes.strike_step
            )));
        }
        if self.feed.base_underlying <= Decimal::ZERO {
            return Err(AppError::Config(
                "feed.base_underlying must be positive".to_string(),
            ));
        }
        if self.feed.amplitude < Decimal::ZERO || self.feed.amplitude >= self.feed.base_underlying
        {
            return Err(AppError::Config(
                "feed.amplitude must be in [0, base_underlying)".to_string(),
            ));
        }
        if self.feed.time_value_decay <= Decimal::ZERO {
            return Err(AppError::Config(
                "feed.time_value_decay must be positive".to_string(),
            ));
        }
        if self.run_loop.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "run_loop.poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
