//! Position ledger.
//!
//! Owns the single paper position of the day plus the history of closed
//! positions. Entry prices are taken verbatim from the snapshot (no slippage
//! model) and P&L is the signed sum over legs:
//!
//! - BUY leg: `(mark - entry) * lot_size * quantity`
//! - SELL leg: `(entry - mark) * lot_size * quantity`

use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use condor_core::{LegRole, LegSide, Money, OptionType, PaperOrderId, Price, PriceBasis};
use condor_feed::{MarketSnapshot, StrikeSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PositionError, PositionResult};

// ============================================================================
// Leg
// ============================================================================

/// One option leg. Only `mark_price` changes after entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub role: LegRole,
    pub strike: Price,
    /// `None` until the leg is filled.
    pub entry_price: Option<Price>,
    pub mark_price: Option<Price>,
    pub lot_size: u32,
    /// Number of lots.
    pub quantity: u32,
}

impl Leg {
    fn unfilled(role: LegRole, strike: Price, lot_size: u32, quantity: u32) -> Self {
        Self {
            role,
            strike,
            entry_price: None,
            mark_price: None,
            lot_size,
            quantity,
        }
    }

    #[must_use]
    pub fn option_type(&self) -> OptionType {
        self.role.option_type()
    }

    #[must_use]
    pub fn side(&self) -> LegSide {
        self.role.side()
    }

    /// Contract units held: `lot_size * quantity`.
    #[must_use]
    pub fn units(&self) -> Decimal {
        Decimal::from(self.lot_size) * Decimal::from(self.quantity)
    }

    /// Unrealized P&L at the last mark. Zero while unfilled or unmarked.
    #[must_use]
    pub fn pnl(&self) -> Money {
        match (self.entry_price, self.mark_price) {
            (Some(entry), Some(mark)) => {
                Money::new((mark.inner() - entry.inner()) * self.units() * self.side().sign())
            }
            _ => Money::ZERO,
        }
    }
}

// ============================================================================
// Position
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Pending,
    Open,
    Closed,
}

/// The four-leg combination, legs indexed by `LegRole`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PaperOrderId,
    legs: [Leg; 4],
    pub entry_time: Option<NaiveDateTime>,
    pub status: PositionStatus,
}

impl Position {
    /// Unfilled position at the given strikes.
    #[must_use]
    pub fn pending(strikes: &StrikeSet, lot_size: u32, quantity: u32) -> Self {
        let legs = LegRole::ALL.map(|role| Leg::unfilled(role, strikes.strike(role), lot_size, quantity));
        Self {
            id: PaperOrderId::new(),
            legs,
            entry_time: None,
            status: PositionStatus::Pending,
        }
    }

    /// Fill every leg at `prices` (role order) and mark it OPEN.
    fn fill(&mut self, prices: [Price; 4], now: NaiveDateTime) {
        for (leg, price) in self.legs.iter_mut().zip(prices) {
            leg.entry_price = Some(price);
            leg.mark_price = Some(price);
        }
        self.entry_time = Some(now);
        self.status = PositionStatus::Open;
    }

    pub fn legs(&self) -> &[Leg; 4] {
        &self.legs
    }

    #[must_use]
    pub fn leg(&self, role: LegRole) -> &Leg {
        &self.legs[role.index()]
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    #[must_use]
    pub fn strike_set(&self) -> StrikeSet {
        StrikeSet::from_strikes(LegRole::ALL.map(|role| self.legs[role.index()].strike))
    }

    /// `(strike, option_type)` of every leg, for quote capture.
    #[must_use]
    pub fn contracts(&self) -> Vec<(Price, OptionType)> {
        self.legs
            .iter()
            .map(|leg| (leg.strike, leg.option_type()))
            .collect()
    }

    /// Unrealized P&L at the last marks.
    #[must_use]
    pub fn unrealized_pnl(&self) -> Money {
        self.legs.iter().map(Leg::pnl).sum()
    }
}

// ============================================================================
// Close
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    StopLoss,
    ForcedExpiryExit,
    SessionEnd,
    Shutdown,
}

impl CloseReason {
    /// Stable label used in logs, metrics and the status file.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StopLoss => "stop_loss",
            Self::ForcedExpiryExit => "forced_expiry_exit",
            Self::SessionEnd => "session_end",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedPosition {
    pub position: Position,
    pub exit_time: NaiveDateTime,
    pub realized_pnl: Money,
    pub reason: CloseReason,
}

// ============================================================================
// PositionLedger
// ============================================================================

/// In-memory paper ledger. At most one position is OPEN at a time.
#[derive(Debug, Clone)]
pub struct PositionLedger {
    lot_size: u32,
    quantity: u32,
    entry_time: NaiveTime,
    open: Option<Position>,
    closed: Vec<ClosedPosition>,
    realized: Money,
}

impl PositionLedger {
    #[must_use]
    pub fn new(lot_size: u32, quantity: u32, entry_time: NaiveTime) -> Self {
        Self {
            lot_size,
            quantity,
            entry_time,
            open: None,
            closed: Vec::new(),
            realized: Money::ZERO,
        }
    }

    /// Open a position at `strikes`, filling each leg at its tradable price.
    ///
    /// # Errors
    ///
    /// - `InvalidEntryWindow` if `now` precedes the entry time or a position
    ///   is already open
    /// - `QuoteUnavailable` if any leg lacks a tradable price; nothing is
    ///   opened in that case
    pub fn open(
        &mut self,
        strikes: &StrikeSet,
        snapshot: &MarketSnapshot,
        basis: PriceBasis,
        now: NaiveDateTime,
    ) -> PositionResult<&Position> {
        if now.time() < self.entry_time {
            return Err(PositionError::InvalidEntryWindow(format!(
                "{} is before entry time {}",
                now.time(),
                self.entry_time
            )));
        }
        if let Some(open) = &self.open {
            return Err(PositionError::InvalidEntryWindow(format!(
                "position {} is already open",
                open.id
            )));
        }

        let prices = snapshot.leg_prices(strikes, basis)?;
        let mut position = Position::pending(strikes, self.lot_size, self.quantity);
        position.fill(prices, now);

        info!(
            id = %position.id,
            entry_time = %now,
            buy_call = %format_leg(position.leg(LegRole::BuyCall)),
            sell_call = %format_leg(position.leg(LegRole::SellCall)),
            buy_put = %format_leg(position.leg(LegRole::BuyPut)),
            sell_put = %format_leg(position.leg(LegRole::SellPut)),
            "Paper position opened"
        );

        Ok(&*self.open.insert(position))
    }

    /// Re-mark every leg and return the position's unrealized P&L.
    ///
    /// Marks are applied only when all four legs are priced, so a partial
    /// snapshot leaves the previous marks in place.
    pub fn mark_to_market(
        &mut self,
        snapshot: &MarketSnapshot,
        basis: PriceBasis,
    ) -> PositionResult<Money> {
        let position = self.open.as_mut().ok_or(PositionError::NoOpenPosition)?;
        let prices = snapshot.leg_prices(&position.strike_set(), basis)?;

        for (leg, price) in position.legs.iter_mut().zip(prices) {
            leg.mark_price = Some(price);
        }
        let pnl = position.unrealized_pnl();
        debug!(id = %position.id, pnl = %pnl, "Marked to market");
        Ok(pnl)
    }

    /// Close the open position at its last marks.
    pub fn close(&mut self, reason: CloseReason, now: NaiveDateTime) -> PositionResult<ClosedPosition> {
        let mut position = self.open.take().ok_or(PositionError::NoOpenPosition)?;
        position.status = PositionStatus::Closed;

        let realized_pnl = position.unrealized_pnl();
        self.realized += realized_pnl;

        let closed = ClosedPosition {
            position,
            exit_time: now,
            realized_pnl,
            reason,
        };
        info!(
            id = %closed.position.id,
            reason = %reason,
            realized_pnl = %realized_pnl,
            day_realized = %self.realized,
            "Paper position closed"
        );
        self.closed.push(closed.clone());
        Ok(closed)
    }

    #[must_use]
    pub fn open_position(&self) -> Option<&Position> {
        self.open.as_ref()
    }

    /// Realized P&L of all positions closed since the last reset.
    #[must_use]
    pub fn realized_pnl(&self) -> Money {
        self.realized
    }

    #[must_use]
    pub fn closed_positions(&self) -> &[ClosedPosition] {
        &self.closed
    }

    /// Drop the day's history. Fails if a position is still open.
    pub fn reset_day(&mut self) -> PositionResult<()> {
        if self.open.is_some() {
            return Err(PositionError::InvalidState(
                "cannot reset ledger with an open position".to_string(),
            ));
        }
        self.closed.clear();
        self.realized = Money::ZERO;
        Ok(())
    }
}

fn format_leg(leg: &Leg) -> String {
    match leg.entry_price {
        Some(price) => format!("{}{}@{}", leg.strike, leg.option_type(), price),
        None => format!("{}{}", leg.strike, leg.option_type()),
    }
}
