//! Condor paper-trading bot - entry point.
//!
//! `run` (the default) drives the strategy; the other subcommands operate
//! the pause files and read the status file of a running bot.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use condor_bot::{AppConfig, Application, StatusReport};
use condor_core::SystemClock;
use condor_risk::{FilePauseSwitch, PauseSwitch};
use tracing::info;

/// Daily four-leg options paper-trading bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path (can also be set via CONDOR_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the paper-trading loop (default)
    Run,
    /// Block new entries and re-entries
    Pause {
        #[arg(short, long, default_value = "manual pause")]
        reason: String,
    },
    /// Allow entries again
    Resume,
    /// Print pause state and the last status snapshot
    Status,
    /// Pause and drop the emergency marker
    EmergencyStop {
        #[arg(short, long, default_value = "emergency stop")]
        reason: String,
    },
    /// Remove the emergency marker and pause file
    ClearEmergency,
    /// Print the effective configuration as TOML
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    condor_telemetry::init_logging(&config.telemetry.log_level)?;

    let clock = SystemClock::new(config.session.utc_offset_minutes)?;
    let switch = FilePauseSwitch::new(
        config.control.pause_file.clone(),
        config.control.emergency_file.clone(),
        Arc::new(clock),
    );

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!("Starting condor-bot v{}", env!("CARGO_PKG_VERSION"));
            Application::new(config)?.run().await?;
        }
        Command::Pause { reason } => switch.pause(&reason)?,
        Command::Resume => switch.resume()?,
        Command::EmergencyStop { reason } => switch.emergency_stop(&reason)?,
        Command::ClearEmergency => switch.clear_emergency()?,
        Command::Status => print_status(&config, &switch)?,
        Command::ShowConfig => println!("{}", toml::to_string_pretty(&config)?),
    }

    Ok(())
}

fn print_status(config: &AppConfig, switch: &FilePauseSwitch) -> Result<()> {
    println!("pause: {}", switch.read());
    if let Some(reason) = switch.reason() {
        println!("reason: {reason}");
    }
    if switch.is_emergency() {
        println!("EMERGENCY STOP ACTIVE");
    }

    match StatusReport::read(&config.control.status_file)? {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => println!(
            "no status file at {}",
            config.control.status_file.display()
        ),
    }
    Ok(())
}
