//! Full trading day scenarios driven tick by tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use condor_core::{LegRole, Money, OptionQuote, OptionType, Price};
use condor_feed::{FeedResult, MarketSnapshot, StrikeLadder, StrikeSelector, StrikeSet};
use condor_lifecycle::{
    Action, DoneReason, LifecycleConfig, LifecycleController, LifecycleState, TickOutcome,
};
use condor_position::{CloseReason, ReEntryConfig};
use condor_risk::PauseState;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const RUNNING: PauseState = PauseState::Running;
const PAUSED: PauseState = PauseState::Paused;

/// 2026-01-21, an ordinary Wednesday.
fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 21).unwrap()
}

/// 2026-01-27, last Tuesday of January: expiry day.
fn expiry_tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 27).unwrap()
}

/// 2026-01-20, a Tuesday that is not the last one.
fn plain_tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()
}

fn at(date: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
    date.and_hms_opt(h, m, s).unwrap()
}

fn controller_with(config: LifecycleConfig, date: NaiveDate) -> LifecycleController<StrikeLadder> {
    LifecycleController::new(config, StrikeLadder::default(), date).unwrap()
}

fn controller(date: NaiveDate) -> LifecycleController<StrikeLadder> {
    controller_with(LifecycleConfig::default(), date)
}

/// Market at `underlying`; every wing trades at 10 and every short at `short`.
///
/// Entered at shorts = 40, the position's P&L is `(40 - short) * 130`.
fn market(underlying: Decimal, short: Decimal, now: NaiveDateTime) -> MarketSnapshot {
    let strikes = StrikeSet::select(&StrikeLadder::default(), Price::new(underlying), 5, 3).unwrap();
    let mut snap = MarketSnapshot::new(Price::new(underlying), now);
    for role in LegRole::ALL {
        let p = match role {
            LegRole::SellCall | LegRole::SellPut => Price::new(short),
            _ => Price::new(dec!(10)),
        };
        snap.insert(strikes.strike(role), role.option_type(), OptionQuote::new(p, p, p));
    }
    snap
}

fn step(
    c: &mut LifecycleController<StrikeLadder>,
    short: Decimal,
    now: NaiveDateTime,
    pause: PauseState,
) -> TickOutcome {
    let snap = market(dec!(20000), short, now);
    c.tick(now, Some(&snap), pause).unwrap()
}

/// Enter at 09:21 and stop out at 10:00 with realized P&L 260.
fn stopped_out(date: NaiveDate) -> LifecycleController<StrikeLadder> {
    let mut c = controller(date);
    step(&mut c, dec!(40), at(date, 9, 21, 0), RUNNING);
    step(&mut c, dec!(37), at(date, 9, 40, 0), RUNNING);
    let out = step(&mut c, dec!(38), at(date, 10, 0, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::ExitedCooling);
    c
}

fn done_reason(out: &TickOutcome) -> Option<DoneReason> {
    out.actions.iter().find_map(|a| match a {
        Action::DayDone { reason } => Some(*reason),
        _ => None,
    })
}

#[test]
fn test_entry_at_0921_records_quotes_exactly() {
    let d = wednesday();
    let mut c = controller(d);

    let out = step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::OpenMonitoring);

    let position = c.open_position().unwrap();
    assert!(position.is_open());
    assert_eq!(position.legs().len(), 4);
    assert_eq!(position.leg(LegRole::BuyCall).strike, Price::new(dec!(20250)));
    assert_eq!(position.leg(LegRole::SellPut).strike, Price::new(dec!(19850)));
    assert_eq!(
        position.leg(LegRole::SellCall).entry_price,
        Some(Price::new(dec!(40)))
    );
    assert_eq!(
        position.leg(LegRole::BuyPut).entry_price,
        Some(Price::new(dec!(10)))
    );
}

#[test]
fn test_no_entry_before_0920() {
    let d = wednesday();
    let mut c = controller(d);
    for (h, m, s) in [(9, 0, 0), (9, 15, 0), (9, 19, 59)] {
        let out = step(&mut c, dec!(40), at(d, h, m, s), RUNNING);
        assert_eq!(out.state, LifecycleState::Idle);
    }
    assert!(c.open_position().is_none());
}

#[test]
fn test_only_one_entry_per_day_without_stop() {
    let d = wednesday();
    let mut c = controller(d);
    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);
    for minute in 22..59 {
        let out = step(&mut c, dec!(40), at(d, 9, minute, 0), RUNNING);
        assert_eq!(out.entries().count(), 0);
    }
    assert_eq!(c.daily_stats().entries, 1);
}

#[test]
fn test_reentry_happens_at_exactly_1005() {
    let d = wednesday();
    let mut c = stopped_out(d);

    let out = step(&mut c, dec!(40), at(d, 10, 4, 59), RUNNING);
    assert_eq!(out.state, LifecycleState::ExitedCooling);
    assert_eq!(out.entries().count(), 0);

    let out = step(&mut c, dec!(40), at(d, 10, 5, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::OpenMonitoring);
    assert_eq!(out.entries().collect::<Vec<_>>(), vec![true]);
    assert!(c.reentry_window().is_none());
    assert_eq!(c.daily_stats().reentries, 1);
    assert_eq!(c.ledger().realized_pnl(), Money::new(dec!(260)));
}

#[test]
fn test_reentered_position_gets_fresh_stop() {
    let d = wednesday();
    let mut c = stopped_out(d);
    step(&mut c, dec!(40), at(d, 10, 5, 0), RUNNING);
    assert!(!c.stop_state().is_armed());
    assert_eq!(c.stop_state().high_water_mark, Money::ZERO);
}

#[test]
fn test_stop_closes_while_paused() {
    let d = wednesday();
    let mut c = controller(d);
    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);
    step(&mut c, dec!(37), at(d, 9, 40, 0), PAUSED);

    let out = step(&mut c, dec!(38), at(d, 10, 0, 0), PAUSED);
    assert_eq!(out.state, LifecycleState::ExitedCooling);
    let exit = out.exits().next().unwrap();
    assert_eq!(exit.reason, CloseReason::StopLoss);
}

#[test]
fn test_pause_blocks_reentry_until_resumed() {
    let d = wednesday();
    let mut c = stopped_out(d);

    let out = step(&mut c, dec!(40), at(d, 10, 5, 0), PAUSED);
    assert_eq!(out.actions, vec![Action::EntrySuppressed]);
    let out = step(&mut c, dec!(40), at(d, 10, 30, 0), PAUSED);
    assert_eq!(out.state, LifecycleState::ExitedCooling);
    assert!(c.reentry_window().is_some());

    let out = step(&mut c, dec!(40), at(d, 10, 31, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::OpenMonitoring);
}

#[test]
fn test_paused_all_morning_never_enters() {
    let d = wednesday();
    let mut c = controller(d);
    for minute in 20..60 {
        let out = step(&mut c, dec!(40), at(d, 9, minute, 0), PAUSED);
        assert_eq!(out.state, LifecycleState::Idle);
    }
    assert_eq!(c.daily_stats().entries, 0);
}

#[test]
fn test_expiry_day_forced_exit_at_1400_even_when_paused() {
    let d = expiry_tuesday();
    let mut c = controller(d);
    assert!(c.context().is_expiry_day);

    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);
    let out = step(&mut c, dec!(39), at(d, 13, 59, 59), PAUSED);
    assert_eq!(out.state, LifecycleState::OpenMonitoring);

    let out = step(&mut c, dec!(39), at(d, 14, 0, 0), PAUSED);
    assert_eq!(out.state, LifecycleState::Done);
    let exit = out.exits().next().unwrap();
    assert_eq!(exit.reason, CloseReason::ForcedExpiryExit);
    assert_eq!(exit.realized_pnl, Money::new(dec!(130)));
    assert_eq!(done_reason(&out), Some(DoneReason::ForcedExit));
    assert!(c.open_position().is_none());

    // Nothing further happens that day
    let out = step(&mut c, dec!(40), at(d, 14, 30, 0), RUNNING);
    assert!(out.is_quiet());
}

#[test]
fn test_expiry_day_forced_exit_without_quotes_uses_last_marks() {
    let d = expiry_tuesday();
    let mut c = controller(d);
    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);
    step(&mut c, dec!(38), at(d, 13, 0, 0), RUNNING);

    let out = c.tick(at(d, 14, 0, 5), None, RUNNING).unwrap();
    assert_eq!(out.state, LifecycleState::Done);
    assert_eq!(
        out.exits().next().unwrap().realized_pnl,
        Money::new(dec!(260))
    );
}

#[test]
fn test_expiry_day_cooling_ends_at_forced_exit() {
    let d = expiry_tuesday();
    let mut c = controller(d);
    step(&mut c, dec!(40), at(d, 13, 30, 0), RUNNING);
    step(&mut c, dec!(37), at(d, 13, 50, 0), RUNNING);
    step(&mut c, dec!(38), at(d, 13, 57, 0), RUNNING);
    assert_eq!(c.state(), LifecycleState::ExitedCooling);

    // Cooldown would end at 14:02, after the forced exit
    let out = step(&mut c, dec!(40), at(d, 14, 0, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::Done);
    assert_eq!(done_reason(&out), Some(DoneReason::ForcedExit));
    assert_eq!(out.entries().count(), 0);
}

#[test]
fn test_expiry_day_no_entry_after_forced_exit_time() {
    let d = expiry_tuesday();
    let mut c = controller(d);
    let out = step(&mut c, dec!(40), at(d, 14, 5, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::Done);
    assert_eq!(done_reason(&out), Some(DoneReason::EntryWindowClosed));
}

#[test]
fn test_plain_tuesday_holds_past_1400() {
    let d = plain_tuesday();
    let mut c = controller(d);
    assert!(!c.context().is_expiry_day);

    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);
    let out = step(&mut c, dec!(39), at(d, 14, 0, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::OpenMonitoring);
    let out = step(&mut c, dec!(39), at(d, 15, 0, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::OpenMonitoring);
    assert!(c.open_position().is_some());
}

#[test]
fn test_session_close_squares_off() {
    let d = wednesday();
    let mut c = controller(d);
    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);

    let out = step(&mut c, dec!(39), at(d, 15, 30, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::Done);
    assert_eq!(out.exits().next().unwrap().reason, CloseReason::SessionEnd);
    assert_eq!(c.daily_stats().session_end_exits, 1);
}

#[test]
fn test_weekend_goes_straight_to_done() {
    let saturday = NaiveDate::from_ymd_opt(2026, 1, 24).unwrap();
    let mut c = controller(saturday);
    let out = step(&mut c, dec!(40), at(saturday, 9, 30, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::Done);
    assert_eq!(done_reason(&out), Some(DoneReason::NonTradingDay));
}

#[test]
fn test_next_day_resets_to_idle_and_enters_again() {
    let d = wednesday();
    let mut c = controller(d);
    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);
    step(&mut c, dec!(40), at(d, 15, 30, 0), RUNNING);
    assert_eq!(c.state(), LifecycleState::Done);

    let next = d.succ_opt().unwrap();
    let out = step(&mut c, dec!(40), at(next, 9, 0, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::Idle);
    assert!(out
        .actions
        .iter()
        .any(|a| matches!(a, Action::DayReset { date } if *date == next)));
    assert_eq!(c.context().date, next);
    assert_eq!(c.daily_stats().entries, 0);

    let out = step(&mut c, dec!(40), at(next, 9, 20, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::OpenMonitoring);
}

#[test]
fn test_date_change_with_open_position_closes_it_first() {
    let d = wednesday();
    let mut c = controller(d);
    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);

    let next = d.succ_opt().unwrap();
    let out = c.tick(at(next, 9, 0, 0), None, RUNNING).unwrap();
    assert!(matches!(out.actions[0], Action::Exited { .. }));
    assert_eq!(out.exits().next().unwrap().reason, CloseReason::SessionEnd);
    assert_eq!(out.state, LifecycleState::Idle);
    assert!(c.open_position().is_none());
}

#[test]
fn test_reentry_limit_ends_day() {
    let d = wednesday();
    let config = LifecycleConfig {
        reentry: ReEntryConfig {
            max_reentries: Some(0),
            ..ReEntryConfig::default()
        },
        ..LifecycleConfig::default()
    };
    let mut c = controller_with(config, d);
    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);
    step(&mut c, dec!(37), at(d, 9, 40, 0), RUNNING);
    step(&mut c, dec!(38), at(d, 10, 0, 0), RUNNING);

    let out = step(&mut c, dec!(40), at(d, 10, 0, 1), RUNNING);
    assert_eq!(out.state, LifecycleState::Done);
    assert_eq!(done_reason(&out), Some(DoneReason::ReEntryLimit));
}

#[test]
fn test_missing_quotes_during_cooldown_keep_cooling() {
    let d = wednesday();
    let mut c = stopped_out(d);
    let out = c.tick(at(d, 10, 6, 0), None, RUNNING).unwrap();
    assert_eq!(out.state, LifecycleState::ExitedCooling);
    assert!(matches!(out.actions[0], Action::Skipped { .. }));

    let out = step(&mut c, dec!(40), at(d, 10, 7, 0), RUNNING);
    assert_eq!(out.state, LifecycleState::OpenMonitoring);
}

#[test]
fn test_never_activated_position_rides_to_close() {
    let d = wednesday();
    let mut c = controller(d);
    step(&mut c, dec!(40), at(d, 9, 21, 0), RUNNING);
    // Best P&L 299 stays below the 300 activation; then a deep loss
    for (short, h) in [(dec!(37.7), 10), (dec!(45), 11), (dec!(60), 12)] {
        let out = step(&mut c, short, at(d, h, 0, 0), RUNNING);
        assert_eq!(out.state, LifecycleState::OpenMonitoring);
    }
    assert!(!c.stop_state().is_armed());
}

/// Ladder that, once skewed, quotes put strikes on the call side.
struct SkewingSelector {
    ladder: StrikeLadder,
    skewed: Arc<AtomicBool>,
}

impl StrikeSelector for SkewingSelector {
    fn select_otm_strike(
        &self,
        underlying: Price,
        option_type: OptionType,
        n: u32,
    ) -> FeedResult<Price> {
        let side = if self.skewed.load(Ordering::SeqCst) {
            OptionType::Call
        } else {
            option_type
        };
        self.ladder.select_otm_strike(underlying, side, n)
    }
}

#[test]
fn test_inconsistent_reselection_ends_day_instead_of_reentering() {
    let d = wednesday();
    let skewed = Arc::new(AtomicBool::new(false));
    let selector = SkewingSelector {
        ladder: StrikeLadder::default(),
        skewed: Arc::clone(&skewed),
    };
    let mut c = LifecycleController::new(LifecycleConfig::default(), selector, d).unwrap();

    for (short, t) in [
        (dec!(40), at(d, 9, 21, 0)),
        (dec!(37), at(d, 9, 40, 0)),
        (dec!(38), at(d, 10, 0, 0)),
    ] {
        c.tick(t, Some(&market(dec!(20000), short, t)), RUNNING)
            .unwrap();
    }
    assert_eq!(c.state(), LifecycleState::ExitedCooling);
    assert!(c.reentry_window().is_some());

    skewed.store(true, Ordering::SeqCst);
    let t = at(d, 10, 5, 0);
    let out = c
        .tick(t, Some(&market(dec!(20000), dec!(40), t)), RUNNING)
        .unwrap();

    assert_eq!(out.state, LifecycleState::Done);
    assert_eq!(done_reason(&out), Some(DoneReason::StrategyInvalidated));
    assert_eq!(out.entries().count(), 0);
    assert!(c.reentry_window().is_none());
    assert!(c.open_position().is_none());
    assert_eq!(c.daily_stats().reentries, 0);
}
