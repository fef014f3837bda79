//! Ledger and trailing stop driven together through a stop-out and re-entry.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use condor_core::{LegRole, Money, OptionQuote, Price, PriceBasis};
use condor_feed::{MarketSnapshot, StrikeLadder, StrikeSet};
use condor_position::{
    CloseReason, PositionError, PositionLedger, ReEntryConfig, ReEntryWindow, TrailingStopEngine,
    TrailingStopState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 21)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn strikes() -> StrikeSet {
    StrikeSet::select(&StrikeLadder::default(), Price::new(dec!(20000)), 5, 3).unwrap()
}

/// Wings fixed at 10, shorts at `short`: P&L = (40 - short) * 65 * 2.
fn snapshot(strikes: &StrikeSet, short: Decimal, now: NaiveDateTime) -> MarketSnapshot {
    let mut snap = MarketSnapshot::new(Price::new(dec!(20000)), now);
    for role in LegRole::ALL {
        let p = match role {
            LegRole::SellCall | LegRole::SellPut => Price::new(short),
            _ => Price::new(dec!(10)),
        };
        snap.insert(strikes.strike(role), role.option_type(), OptionQuote::new(p, p, p));
    }
    snap
}

#[test]
fn test_stop_out_then_reenter_after_cooldown() {
    let s = strikes();
    let mut ledger = PositionLedger::new(65, 1, NaiveTime::from_hms_opt(9, 20, 0).unwrap());
    let engine = TrailingStopEngine::default();
    let mut stop = TrailingStopState::new();

    ledger
        .open(&s, &snapshot(&s, dec!(40), at(9, 21, 0)), PriceBasis::Last, at(9, 21, 0))
        .unwrap();

    // 37.5 -> 325, 37 -> 390, 37.8 -> 286
    let mut triggered_at = None;
    for (short, now) in [
        (dec!(37.5), at(9, 40, 0)),
        (dec!(37), at(9, 50, 0)),
        (dec!(37.8), at(10, 0, 0)),
    ] {
        let pnl = ledger
            .mark_to_market(&snapshot(&s, short, now), PriceBasis::Last)
            .unwrap();
        let eval = engine.evaluate(pnl, stop);
        stop = eval.state;
        if eval.triggered {
            triggered_at = Some(now);
            break;
        }
    }

    assert_eq!(stop.high_water_mark, Money::new(dec!(390)));
    assert_eq!(stop.current_stop_level, Some(Money::new(dec!(340))));
    let hit = triggered_at.expect("stop should trigger at 286");
    assert_eq!(hit, at(10, 0, 0));

    let closed = ledger.close(CloseReason::StopLoss, hit).unwrap();
    assert_eq!(closed.realized_pnl, Money::new(dec!(286)));

    let window = ReEntryWindow::new(hit, ReEntryConfig::default().cooldown());
    assert!(!window.is_eligible(at(10, 4, 59)));
    assert!(window.is_eligible(at(10, 5, 0)));

    ledger
        .open(&s, &snapshot(&s, dec!(38), at(10, 5, 0)), PriceBasis::Last, at(10, 5, 0))
        .unwrap();
    assert_eq!(ledger.realized_pnl(), Money::new(dec!(286)));
    assert!(matches!(
        ledger.open(&s, &snapshot(&s, dec!(38), at(10, 6, 0)), PriceBasis::Last, at(10, 6, 0)),
        Err(PositionError::InvalidEntryWindow(_))
    ));
}
