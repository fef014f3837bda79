//! Paper session integration tests.
//!
//! Drives `Application::run_tick` with a manual clock, an in-process pause
//! latch and a flat synthetic feed.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use condor_bot::{AppConfig, Application, StatusReport};
use condor_core::{Clock, Money};
use condor_lifecycle::{Action, DoneReason, LifecycleState};
use condor_position::CloseReason;
use condor_risk::{PauseLatch, PauseState};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tempfile::TempDir;

struct ManualClock(Mutex<NaiveDateTime>);

impl ManualClock {
    fn new(start: NaiveDateTime) -> Arc<Self> {
        Arc::new(Self(Mutex::new(start)))
    }

    fn set(&self, now: NaiveDateTime) {
        *self.0.lock() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock()
    }
}

fn at(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    day.and_hms_opt(h, m, 0).unwrap()
}

fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 21).unwrap()
}

fn expiry_tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 27).unwrap()
}

struct Harness {
    app: Application,
    clock: Arc<ManualClock>,
    latch: Arc<PauseLatch>,
    dir: TempDir,
}

impl Harness {
    fn new(start: NaiveDateTime) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.feed.amplitude = Decimal::ZERO;
        config.telemetry.metrics_port = 0;
        config.control.status_file = dir.path().join("trading_status.json");

        let clock = ManualClock::new(start);
        let latch = Arc::new(PauseLatch::new());
        let app = Application::with_parts(
            config,
            Box::new(Arc::clone(&clock)),
            Box::new(Arc::clone(&latch)),
        )
        .unwrap();

        Self {
            app,
            clock,
            latch,
            dir,
        }
    }

    fn tick_at(&mut self, now: NaiveDateTime) -> Vec<Action> {
        self.clock.set(now);
        self.app.run_tick().unwrap().actions
    }

    fn status_file(&self) -> StatusReport {
        StatusReport::read(&self.dir.path().join("trading_status.json"))
            .unwrap()
            .unwrap()
    }
}

fn entered(actions: &[Action]) -> bool {
    actions
        .iter()
        .any(|a| matches!(a, Action::Entered { reentry: false, .. }))
}

#[test]
fn test_waits_then_enters_and_reports() {
    let day = wednesday();
    let mut h = Harness::new(at(day, 9, 0));

    let actions = h.tick_at(at(day, 9, 15));
    assert!(actions.is_empty());
    assert_eq!(h.app.controller().state(), LifecycleState::Idle);
    assert!(h.status_file().position.is_none());

    let actions = h.tick_at(at(day, 9, 21));
    assert!(entered(&actions));
    assert_eq!(h.app.controller().state(), LifecycleState::OpenMonitoring);

    let report = h.status_file();
    assert_eq!(report.state, LifecycleState::OpenMonitoring);
    assert_eq!(report.entries_today, 1);
    let position = report.position.as_ref().expect("open position in status");
    assert_eq!(position.legs.len(), 4);
    // Flat feed: marks equal entry prices.
    assert_eq!(position.unrealized_pnl, Money::ZERO);
    assert!(report.stop_level.is_none());

    let shared = h.app.status();
    assert_eq!(shared.read().as_ref(), Some(&report));
}

#[test]
fn test_pause_suppresses_entry_until_resumed() {
    let day = wednesday();
    let mut h = Harness::new(at(day, 9, 0));

    h.latch.pause("operator");
    let actions = h.tick_at(at(day, 9, 21));
    assert_eq!(actions, vec![Action::EntrySuppressed]);
    assert_eq!(h.app.controller().state(), LifecycleState::Idle);

    let report = h.status_file();
    assert_eq!(report.pause, PauseState::Paused);
    assert_eq!(report.pause_reason.as_deref(), Some("operator"));

    // Logged once per pause.
    assert!(h.tick_at(at(day, 9, 22)).is_empty());

    h.latch.resume();
    assert!(entered(&h.tick_at(at(day, 9, 23))));
    assert_eq!(h.status_file().pause, PauseState::Running);
}

#[test]
fn test_pause_does_not_close_open_position() {
    let day = wednesday();
    let mut h = Harness::new(at(day, 9, 0));

    assert!(entered(&h.tick_at(at(day, 9, 21))));
    h.latch.pause("lunch");

    let actions = h.tick_at(at(day, 12, 0));
    assert!(actions.iter().all(|a| !matches!(a, Action::Exited { .. })));
    assert!(h.app.controller().open_position().is_some());
}

#[test]
fn test_expiry_day_forced_exit_while_paused() {
    let day = expiry_tuesday();
    let mut h = Harness::new(at(day, 9, 0));

    assert!(entered(&h.tick_at(at(day, 9, 21))));
    h.latch.pause("operator");

    let actions = h.tick_at(at(day, 14, 0));
    let exit = actions
        .iter()
        .find_map(|a| match a {
            Action::Exited { closed } => Some(closed),
            _ => None,
        })
        .expect("forced exit");
    assert_eq!(exit.reason, CloseReason::ForcedExpiryExit);
    assert!(actions.contains(&Action::DayDone {
        reason: DoneReason::ForcedExit
    }));

    let report = h.status_file();
    assert_eq!(report.state, LifecycleState::Done);
    assert!(report.is_expiry_day);
    assert!(report.position.is_none());
}

#[test]
fn test_shutdown_closes_open_position() {
    let day = wednesday();
    let mut h = Harness::new(at(day, 9, 0));

    assert!(entered(&h.tick_at(at(day, 9, 21))));
    h.clock.set(at(day, 10, 0));
    h.app.shutdown().unwrap();

    assert!(h.app.controller().open_position().is_none());
    let closed = h.app.controller().ledger().closed_positions();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].reason, CloseReason::Shutdown);
    assert!(h.status_file().position.is_none());
}

#[test]
fn test_weekend_never_enters() {
    let saturday = NaiveDate::from_ymd_opt(2026, 1, 24).unwrap();
    let mut h = Harness::new(at(saturday, 9, 0));

    let actions = h.tick_at(at(saturday, 9, 30));
    assert_eq!(
        actions,
        vec![Action::DayDone {
            reason: DoneReason::NonTradingDay
        }]
    );
    assert!(h.tick_at(at(saturday, 10, 0)).is_empty());
}

#[test]
fn test_status_write_failure_keeps_trading() {
    let day = wednesday();
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.feed.amplitude = Decimal::ZERO;
    config.telemetry.metrics_port = 0;
    config.control.status_file = dir.path().join("missing").join("trading_status.json");

    let clock = ManualClock::new(at(day, 9, 0));
    let mut app = Application::with_parts(
        config,
        Box::new(Arc::clone(&clock)),
        Box::new(Arc::new(PauseLatch::new())),
    )
    .unwrap();

    clock.set(at(day, 9, 21));
    let outcome = app.run_tick().expect("status write failure is not fatal");
    assert!(entered(&outcome.actions));

    clock.set(at(day, 9, 22));
    let outcome = app.run_tick().unwrap();
    assert_eq!(outcome.state, LifecycleState::OpenMonitoring);
    assert!(app.controller().open_position().is_some());

    // The in-process status still tracks the controller.
    let shared = app.status();
    let report = shared.read().clone().expect("shared status published");
    assert_eq!(report.state, LifecycleState::OpenMonitoring);
    assert!(!dir.path().join("missing").exists());
}
