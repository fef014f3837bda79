//! Application: the polling run loop around the lifecycle controller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use condor_core::{Clock, Money, SystemClock};
use condor_feed::{capture_snapshot, MarketSnapshot, StrikeLadder, SyntheticQuoteSource};
use condor_lifecycle::{Action, LifecycleController, TickOutcome};
use condor_position::ClosedPosition;
use condor_risk::{FilePauseSwitch, PauseState, PauseSwitch};
use condor_telemetry::Metrics;
use parking_lot::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::server::{run_server, SharedStatus};
use crate::status::StatusReport;

/// Main application.
pub struct Application {
    config: AppConfig,
    controller: LifecycleController<StrikeLadder>,
    ladder: StrikeLadder,
    feed: SyntheticQuoteSource,
    pause: Box<dyn PauseSwitch>,
    clock: Box<dyn Clock>,
    /// Clock reading that anchors the synthetic underlying path.
    feed_epoch: NaiveDateTime,
    last_pause: PauseState,
    status: SharedStatus,
}

impl Application {
    /// Create the application with the system clock and file pause switch.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let clock: Arc<dyn Clock> =
            Arc::new(SystemClock::new(config.session.utc_offset_minutes)?);
        let pause = FilePauseSwitch::new(
            config.control.pause_file.clone(),
            config.control.emergency_file.clone(),
            Arc::clone(&clock),
        );
        Self::with_parts(config, Box::new(clock), Box::new(pause))
    }

    /// Create the application with injected clock and pause switch.
    pub fn with_parts(
        config: AppConfig,
        clock: Box<dyn Clock>,
        pause: Box<dyn PauseSwitch>,
    ) -> AppResult<Self> {
        config.validate()?;

        let now = clock.now();
        let ladder = StrikeLadder::from_config(&config.strikes);
        let controller = LifecycleController::new(config.lifecycle(), ladder, now.date())?;
        let feed = SyntheticQuoteSource::new(config.feed.clone());

        info!(
            lot_size = config.strategy.lot_size,
            quantity = config.strategy.quantity,
            buy_otm = config.strategy.buy_otm,
            sell_otm = config.strategy.sell_otm,
            activation = %config.trailing_stop.activation_threshold,
            buffer = %config.trailing_stop.initial_buffer,
            increment = %config.trailing_stop.trail_increment,
            cooldown_secs = config.reentry.cooldown_secs,
            "Paper trading application initialized"
        );

        Ok(Self {
            config,
            controller,
            ladder,
            feed,
            pause,
            clock,
            feed_epoch: now,
            last_pause: PauseState::Running,
            status: Arc::new(RwLock::new(None)),
        })
    }

    pub fn controller(&self) -> &LifecycleController<StrikeLadder> {
        &self.controller
    }

    pub fn feed(&self) -> &SyntheticQuoteSource {
        &self.feed
    }

    pub fn status(&self) -> SharedStatus {
        Arc::clone(&self.status)
    }

    /// Run until ctrl-c, then shut down.
    pub async fn run(mut self) -> AppResult<()> {
        let server = match self.config.telemetry.metrics_port {
            0 => None,
            port => {
                let status = self.status();
                Some(tokio::spawn(async move {
                    if let Err(e) = run_server(status, port).await {
                        error!(error = %e, "Metrics server failed");
                    }
                }))
            }
        };

        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.run_loop.poll_interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        info!(
            poll_interval_ms = self.config.run_loop.poll_interval_ms,
            "Entering run loop"
        );

        let result = loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_tick() {
                        error!(error = %e, "Tick failed, stopping");
                        break Err(e);
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break Ok(());
                }
            }
        };

        self.shutdown()?;
        if let Some(handle) = server {
            handle.abort();
        }
        result
    }

    /// One poll: read pause, capture quotes, tick, report.
    ///
    /// # Errors
    ///
    /// Only controller errors are returned. Feed and status-file failures
    /// are logged and counted, and the loop keeps running.
    pub fn run_tick(&mut self) -> AppResult<TickOutcome> {
        let started = Instant::now();
        let now = self.clock.now();

        let pause = self.pause.read();
        if pause != self.last_pause {
            info!(from = %self.last_pause, to = %pause, "Pause state changed");
            self.last_pause = pause;
        }
        Metrics::paused(pause.is_paused());

        let snapshot = match self.advance_feed(now) {
            Ok(()) => self.capture(now),
            Err(e) => {
                warn!(error = %e, "Feed advance failed");
                Metrics::run_loop_error("feed_advance");
                None
            }
        };

        let outcome = self.controller.tick(now, snapshot.as_ref(), pause)?;
        for action in &outcome.actions {
            record_action(action);
        }

        self.publish(pause, now);
        Metrics::tick_duration(started.elapsed().as_secs_f64() * 1000.0);
        Ok(outcome)
    }

    /// Close any open position and write a final status.
    pub fn shutdown(&mut self) -> AppResult<()> {
        let now = self.clock.now();
        if let Some(closed) = self.controller.shutdown(now)? {
            record_exit(&closed);
        }
        let pause = self.pause.read();
        self.publish(pause, now);
        info!(
            realized_pnl = %self.controller.ledger().realized_pnl(),
            "Shutdown complete"
        );
        Ok(())
    }

    fn advance_feed(&self, now: NaiveDateTime) -> AppResult<()> {
        let elapsed_ms = (now - self.feed_epoch).num_milliseconds();
        self.feed.advance(elapsed_ms as f64 / 1000.0)?;
        Ok(())
    }

    fn capture(&self, now: NaiveDateTime) -> Option<MarketSnapshot> {
        let held = self
            .controller
            .open_position()
            .map(|p| p.contracts())
            .unwrap_or_default();
        let strategy = self.config.strategy;
        match capture_snapshot(
            &self.feed,
            &self.ladder,
            strategy.buy_otm,
            strategy.sell_otm,
            &held,
            now,
        ) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "Quote capture failed");
                None
            }
        }
    }

    /// Push gauges, status file and shared status.
    ///
    /// A failed status write is logged; the shared status is still updated.
    fn publish(&self, pause: PauseState, now: NaiveDateTime) {
        let report =
            StatusReport::from_controller(&self.controller, pause, self.pause.reason(), now);

        Metrics::lifecycle_state(report.state.as_str());
        Metrics::position_pnl(report.unrealized_pnl());
        Metrics::stop_level(report.stop_level);
        Metrics::realized_pnl(report.realized_pnl_today);

        if let Err(e) = report.write(&self.config.control.status_file) {
            warn!(
                error = %e,
                path = %self.config.control.status_file.display(),
                "Status file write failed"
            );
            Metrics::run_loop_error("status_write");
        }
        *self.status.write() = Some(report);
    }
}

fn record_action(action: &Action) {
    match action {
        Action::Entered {
            position_id,
            strikes,
            reentry,
        } => {
            Metrics::entry(*reentry);
            info!(id = %position_id, reentry, strikes = ?strikes, "Entry");
        }
        Action::StopArmed {
            level,
            high_water_mark,
        } => info!(stop_level = %level, high_water_mark = %high_water_mark, "Stop armed"),
        Action::StopRaised {
            level,
            high_water_mark,
        } => info!(stop_level = %level, high_water_mark = %high_water_mark, "Stop raised"),
        Action::Exited { closed } => record_exit(closed),
        Action::CooldownStarted { eligible_after } => {
            info!(eligible_after = %eligible_after, "Re-entry cooldown started");
        }
        Action::EntrySuppressed => {
            Metrics::tick_skipped("paused");
            info!("Entry suppressed: trading paused");
        }
        Action::Skipped { reason } => {
            Metrics::tick_skipped("quotes_unavailable");
            warn!(reason = %reason, "Tick skipped");
        }
        Action::DayDone { reason } => info!(reason = %reason, "Day done"),
        Action::DayReset { date } => info!(date = %date, "Day reset"),
    }
}

fn record_exit(closed: &ClosedPosition) {
    Metrics::exit(closed.reason.as_str());
    let pnl: Money = closed.realized_pnl;
    info!(
        id = %closed.position.id,
        reason = %closed.reason,
        realized_pnl = %pnl,
        exit_time = %closed.exit_time,
        "Exit"
    );
}
