//! Lifecycle controller.
//!
//! One `tick` per poll. Each tick first rolls the day over if the date has
//! changed, then runs the handler for the current state. Pause gates only
//! the transitions that open a position; closes always run.

use chrono::{NaiveDate, NaiveDateTime};
use condor_core::{Money, TradingDayContext};
use condor_feed::{MarketSnapshot, StrikeSelector, StrikeSet};
use condor_position::{
    CloseReason, ClosedPosition, Position, PositionError, PositionLedger, ReEntryWindow,
    TrailingStopEngine, TrailingStopState,
};
use condor_risk::PauseState;
use condor_telemetry::DailyStats;
use tracing::{debug, info, warn};

use crate::action::{Action, DoneReason, TickOutcome};
use crate::config::LifecycleConfig;
use crate::error::{LifecycleError, LifecycleResult};
use crate::state::LifecycleState;

pub struct LifecycleController<S: StrikeSelector> {
    config: LifecycleConfig,
    selector: S,
    engine: TrailingStopEngine,
    context: TradingDayContext,
    state: LifecycleState,
    ledger: PositionLedger,
    stop: TrailingStopState,
    window: Option<ReEntryWindow>,
    reentries: u32,
    stats: DailyStats,
    /// An `EntrySuppressed` was already reported for the current pause.
    suppression_reported: bool,
}

impl<S: StrikeSelector> LifecycleController<S> {
    /// Create a controller in IDLE for `today`.
    pub fn new(config: LifecycleConfig, selector: S, today: NaiveDate) -> LifecycleResult<Self> {
        config.validate()?;
        let context = TradingDayContext::derive(today, &config.session);
        info!(
            date = %today,
            trading_day = context.is_trading_day,
            expiry_day = context.is_expiry_day,
            "Lifecycle controller ready"
        );

        Ok(Self {
            ledger: PositionLedger::new(
                config.strategy.lot_size,
                config.strategy.quantity,
                config.session.entry_time,
            ),
            engine: TrailingStopEngine::new(config.trailing_stop),
            config,
            selector,
            context,
            state: LifecycleState::Idle,
            stop: TrailingStopState::new(),
            window: None,
            reentries: 0,
            stats: DailyStats::new(today),
            suppression_reported: false,
        })
    }

    /// Advance the state machine by one poll.
    ///
    /// `snapshot` is `None` when quotes could not be captured this tick.
    ///
    /// # Errors
    ///
    /// Only ledger misuse escapes as an error. Missing quotes are reported
    /// as `Action::Skipped` and leave the state untouched.
    pub fn tick(
        &mut self,
        now: NaiveDateTime,
        snapshot: Option<&MarketSnapshot>,
        pause: PauseState,
    ) -> LifecycleResult<TickOutcome> {
        let mut actions = Vec::new();

        if !pause.is_paused() {
            self.suppression_reported = false;
        }

        if self.context.is_stale(now) {
            self.roll_over(now, &mut actions)?;
        }

        match self.state {
            LifecycleState::Done => {}
            LifecycleState::Idle => self.on_idle(now, snapshot, pause, &mut actions)?,
            LifecycleState::OpenMonitoring => self.on_open(now, snapshot, &mut actions)?,
            LifecycleState::ExitedCooling => self.on_cooling(now, snapshot, pause, &mut actions)?,
        }

        Ok(TickOutcome {
            state: self.state,
            actions,
        })
    }

    /// Close any open position for process shutdown.
    pub fn shutdown(&mut self, now: NaiveDateTime) -> LifecycleResult<Option<ClosedPosition>> {
        if self.ledger.open_position().is_none() {
            return Ok(None);
        }
        let closed = self.close(CloseReason::Shutdown, now)?;
        self.window = None;
        self.state = LifecycleState::Done;
        self.stats.report();
        Ok(Some(closed))
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn context(&self) -> &TradingDayContext {
        &self.context
    }

    pub fn daily_stats(&self) -> &DailyStats {
        &self.stats
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn open_position(&self) -> Option<&Position> {
        self.ledger.open_position()
    }

    pub fn stop_state(&self) -> &TrailingStopState {
        &self.stop
    }

    pub fn reentry_window(&self) -> Option<&ReEntryWindow> {
        self.window.as_ref()
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    // ------------------------------------------------------------------------
    // State handlers
    // ------------------------------------------------------------------------

    fn on_idle(
        &mut self,
        now: NaiveDateTime,
        snapshot: Option<&MarketSnapshot>,
        pause: PauseState,
        actions: &mut Vec<Action>,
    ) -> LifecycleResult<()> {
        if !self.context.is_trading_day {
            self.finish(DoneReason::NonTradingDay, actions);
            return Ok(());
        }
        if self.context.forced_exit_due(now) || self.context.session_over(now) {
            self.finish(DoneReason::EntryWindowClosed, actions);
            return Ok(());
        }
        if !self.context.entry_open(now) {
            return Ok(());
        }
        if pause.is_paused() {
            self.suppress(actions);
            return Ok(());
        }
        let Some(snapshot) = snapshot else {
            actions.push(skipped("quotes unavailable"));
            return Ok(());
        };

        let strikes = match self.select_strikes(snapshot) {
            Ok(strikes) => strikes,
            Err(reason) => {
                actions.push(skipped(reason));
                return Ok(());
            }
        };
        self.enter(&strikes, snapshot, now, false, actions)
    }

    fn on_open(
        &mut self,
        now: NaiveDateTime,
        snapshot: Option<&MarketSnapshot>,
        actions: &mut Vec<Action>,
    ) -> LifecycleResult<()> {
        let exit = if self.context.forced_exit_due(now) {
            Some((CloseReason::ForcedExpiryExit, DoneReason::ForcedExit))
        } else if self.context.session_over(now) {
            Some((CloseReason::SessionEnd, DoneReason::SessionEnd))
        } else {
            None
        };

        if let Some((close_reason, done_reason)) = exit {
            // Best effort re-mark; a stale mark still closes.
            if let Some(snapshot) = snapshot {
                if let Err(e) = self.mark(snapshot) {
                    warn!(error = %e, "Closing at last marks");
                }
            }
            let closed = self.close(close_reason, now)?;
            actions.push(Action::Exited { closed });
            self.finish(done_reason, actions);
            return Ok(());
        }

        let Some(snapshot) = snapshot else {
            actions.push(skipped("quotes unavailable"));
            return Ok(());
        };
        let pnl = match self.mark(snapshot) {
            Ok(pnl) => pnl,
            Err(PositionError::QuoteUnavailable(reason)) => {
                actions.push(Action::Skipped { reason });
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let eval = self.engine.evaluate(pnl, self.stop);
        self.stop = eval.state;
        self.stats.observe_high_water(eval.state.high_water_mark);

        if let Some(level) = eval.state.current_stop_level {
            let high_water_mark = eval.state.high_water_mark;
            if eval.armed_now {
                actions.push(Action::StopArmed {
                    level,
                    high_water_mark,
                });
            } else if eval.raised {
                actions.push(Action::StopRaised {
                    level,
                    high_water_mark,
                });
            }
        }

        if eval.triggered {
            let closed = self.close(CloseReason::StopLoss, now)?;
            let window = ReEntryWindow::new(now, self.config.reentry.cooldown());
            info!(
                pnl = %pnl,
                stop_level = ?eval.state.current_stop_level,
                eligible_after = %window.reentry_eligible_after,
                "Trailing stop triggered"
            );
            actions.push(Action::Exited { closed });
            actions.push(Action::CooldownStarted {
                eligible_after: window.reentry_eligible_after,
            });
            self.window = Some(window);
            self.state = LifecycleState::ExitedCooling;
        }
        Ok(())
    }

    fn on_cooling(
        &mut self,
        now: NaiveDateTime,
        snapshot: Option<&MarketSnapshot>,
        pause: PauseState,
        actions: &mut Vec<Action>,
    ) -> LifecycleResult<()> {
        let Some(window) = self.window else {
            return Err(LifecycleError::InvalidState(
                "cooling without a re-entry window".to_string(),
            ));
        };

        if self.context.forced_exit_due(now) {
            self.finish(DoneReason::ForcedExit, actions);
            return Ok(());
        }
        if self.context.session_over(now) {
            self.finish(DoneReason::SessionEnd, actions);
            return Ok(());
        }
        if !self.config.reentry.allows_another(self.reentries) {
            self.finish(DoneReason::ReEntryLimit, actions);
            return Ok(());
        }
        if !window.is_eligible(now) {
            return Ok(());
        }
        if pause.is_paused() {
            self.suppress(actions);
            return Ok(());
        }
        let Some(snapshot) = snapshot else {
            actions.push(skipped("quotes unavailable"));
            return Ok(());
        };

        let strikes = match self.select_strikes(snapshot) {
            Ok(strikes) => strikes,
            Err(reason) => {
                actions.push(skipped(reason));
                return Ok(());
            }
        };
        if let Err(e) = strikes.validate(snapshot.underlying) {
            info!(error = %e, "Re-entry condition no longer holds");
            self.finish(DoneReason::StrategyInvalidated, actions);
            return Ok(());
        }

        self.enter(&strikes, snapshot, now, true, actions)
    }

    fn roll_over(&mut self, now: NaiveDateTime, actions: &mut Vec<Action>) -> LifecycleResult<()> {
        if self.ledger.open_position().is_some() {
            let closed = self.close(CloseReason::SessionEnd, now)?;
            actions.push(Action::Exited { closed });
        }
        if self.state != LifecycleState::Done {
            self.stats.report();
        }
        self.ledger.reset_day()?;

        let date = now.date();
        self.context = TradingDayContext::derive(date, &self.config.session);
        self.state = LifecycleState::Idle;
        self.stop = TrailingStopState::new();
        self.window = None;
        self.reentries = 0;
        self.stats = DailyStats::new(date);

        info!(
            date = %date,
            trading_day = self.context.is_trading_day,
            expiry_day = self.context.is_expiry_day,
            "New trading day"
        );
        actions.push(Action::DayReset { date });
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn select_strikes(&self, snapshot: &MarketSnapshot) -> Result<StrikeSet, String> {
        StrikeSet::select(
            &self.selector,
            snapshot.underlying,
            self.config.strategy.buy_otm,
            self.config.strategy.sell_otm,
        )
        .map_err(|e| e.to_string())
    }

    fn enter(
        &mut self,
        strikes: &StrikeSet,
        snapshot: &MarketSnapshot,
        now: NaiveDateTime,
        reentry: bool,
        actions: &mut Vec<Action>,
    ) -> LifecycleResult<()> {
        let position_id = match self
            .ledger
            .open(strikes, snapshot, self.config.strategy.price_basis, now)
        {
            Ok(position) => position.id.clone(),
            Err(PositionError::QuoteUnavailable(reason)) => {
                actions.push(Action::Skipped { reason });
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if reentry {
            self.reentries += 1;
            self.window = None;
        }
        self.stop = TrailingStopState::new();
        self.stats.record_entry(reentry);
        self.state = LifecycleState::OpenMonitoring;

        info!(id = %position_id, reentry, underlying = %snapshot.underlying, "Entered position");
        actions.push(Action::Entered {
            position_id,
            strikes: *strikes,
            reentry,
        });
        Ok(())
    }

    fn mark(&mut self, snapshot: &MarketSnapshot) -> Result<Money, PositionError> {
        self.ledger
            .mark_to_market(snapshot, self.config.strategy.price_basis)
    }

    fn close(&mut self, reason: CloseReason, now: NaiveDateTime) -> LifecycleResult<ClosedPosition> {
        let closed = self.ledger.close(reason, now)?;
        self.stats.record_exit(reason.as_str(), closed.realized_pnl);
        Ok(closed)
    }

    fn finish(&mut self, reason: DoneReason, actions: &mut Vec<Action>) {
        self.window = None;
        self.state = LifecycleState::Done;
        info!(reason = %reason, date = %self.context.date, "Trading day done");
        self.stats.report();
        actions.push(Action::DayDone { reason });
    }

    fn suppress(&mut self, actions: &mut Vec<Action>) {
        if !self.suppression_reported {
            info!(state = %self.state, "Entry suppressed while paused");
            actions.push(Action::EntrySuppressed);
            self.suppression_reported = true;
        } else {
            debug!("Still paused");
        }
    }
}

fn skipped(reason: impl Into<String>) -> Action {
    Action::Skipped {
        reason: reason.into(),
    }
}
