//! Precision-safe decimal types for trading.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Premiums and P&L are
//! rupee amounts with paise precision, so floating point is never used for
//! ledger or stop-loss arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Used for option premiums, strikes and the underlying index level.
/// Kept distinct from `Money` so a premium is never mistaken for P&L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round to the nearest multiple of `step` (midpoint away from zero).
    ///
    /// Used to find the at-the-money strike from the underlying level.
    #[inline]
    pub fn round_to_step(&self, step: Price) -> Self {
        if step.is_zero() {
            return *self;
        }
        Self(
            (self.0 / step.0).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                * step.0,
        )
    }

    /// Value of `units` contracts at this price, as money.
    #[inline]
    pub fn times_units(&self, units: Decimal) -> Money {
        Money(self.0 * units)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Currency amount (rupees) with exact decimal precision.
///
/// Signed: negative values are losses. Used for mark-to-market P&L,
/// realized P&L and every trailing stop parameter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_round_to_step_nearest() {
        let step = Price::new(dec!(50));
        assert_eq!(Price::new(dec!(20012)).round_to_step(step).0, dec!(20000));
        assert_eq!(Price::new(dec!(20030)).round_to_step(step).0, dec!(20050));
        // Midpoint rounds away from zero
        assert_eq!(Price::new(dec!(20025)).round_to_step(step).0, dec!(20050));
        assert_eq!(Price::new(dec!(20125)).round_to_step(step).0, dec!(20150));
    }

    #[test]
    fn test_price_round_to_zero_step_is_identity() {
        let price = Price::new(dec!(19987.35));
        assert_eq!(price.round_to_step(Price::ZERO), price);
    }

    #[test]
    fn test_times_units() {
        // 2.5 rupees of premium move on one lot of 65
        let delta = Price::new(dec!(2.5));
        assert_eq!(delta.times_units(dec!(65)), Money::new(dec!(162.5)));
    }

    #[test]
    fn test_money_sum_and_sign() {
        let total: Money = [dec!(120), dec!(-45.5), dec!(10)]
            .into_iter()
            .map(Money::new)
            .sum();
        assert_eq!(total, Money::new(dec!(84.5)));
        assert!(total.is_positive());
        assert!((-total).is_negative());
    }

    #[test]
    fn test_money_max() {
        let a = Money::new(dec!(250));
        let b = Money::new(dec!(300));
        assert_eq!(a.max(b), b);
        assert_eq!(b.max(a), b);
    }
}
