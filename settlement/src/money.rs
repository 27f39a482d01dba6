//! Minor-unit money
//!
//! Balances cross the crate boundary as [`Decimal`] but every settlement
//! computation runs on whole cents, so no epsilon comparison is needed and
//! amounts never drift across repeated subtraction.

use crate::{Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Decimal places of the settlement currency's minor unit
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Signed amount in minor units (cents)
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(i64);

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(0);

    /// One minor unit (0.01)
    pub const ONE_CENT: Money = Money(1);

    /// Largest representable amount; the range is symmetric around zero
    pub const MAX: Money = Money(i64::MAX);

    /// Create from a count of cents
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Amount in cents
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Convert a decimal amount, rounding half away from zero to cents.
    ///
    /// `0.005` becomes `0.01` and `-0.005` becomes `-0.01`. Amounts beyond
    /// `±Money::MAX` are rejected.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        value
            .round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .filter(|&cents| cents != i64::MIN)
            .map(Self)
            .ok_or_else(|| Error::AmountOutOfRange(value.to_string()))
    }

    /// Exact decimal representation with two fractional digits
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    /// Absolute value, `None` for `i64::MIN` cents
    pub fn checked_abs(self) -> Option<Self> {
        self.0.checked_abs().map(Self)
    }

    /// Sum without saturating, `None` on overflow
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Absolute value (saturating; see [`Money::checked_abs`])
    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Check if zero
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Check if strictly positive
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Check if strictly negative
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl TryFrom<Decimal> for Money {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self> {
        Money::from_decimal(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.to_decimal()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
