//! Exact monetary amounts.
//!
//! Amounts are stored as signed integer cents. Anything coming from outside
//! (request bodies, store rows, fee rates) goes through [`Decimal`] and is
//! rounded to the cent with [`round2`], so repeated operations never drift.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::MoneyError;

/// Number of decimal places kept on every amount.
pub const MONEY_SCALE: u32 = 2;

/// Round a decimal to the nearest cent, midpoint away from zero.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A monetary amount with exact two-decimal precision.
///
/// Serialized as a decimal string (`"46.00"`); deserialized from a string or a
/// JSON number, rounded to the cent.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a number of cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Create an amount from a decimal, rounding to the nearest cent.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::OutOfRange` if the value does not fit in `i64` cents.
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        round2(value)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self)
            .ok_or(MoneyError::OutOfRange(value))
    }

    /// The amount as a two-decimal [`Decimal`].
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MONEY_SCALE)
    }

    /// Multiply by a rate and round the result to the cent.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the product does not fit.
    pub fn apply_rate(self, rate: Decimal) -> Result<Self, MoneyError> {
        let product = self
            .to_decimal()
            .checked_mul(rate)
            .ok_or(MoneyError::Overflow)?;
        Self::from_decimal(product)
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Checked subtraction.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether the amount is strictly less than zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.to_decimal()
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| MoneyError::Parse(s.to_string()))?;
        Self::from_decimal(value)
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({})", self.to_decimal())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_displays_two_decimals() {
        assert_eq!(money("46").to_string(), "46.00");
        assert_eq!(money("0.5").cents(), 50);
        assert_eq!(money(" 19.99 ").cents(), 1999);
    }

    #[test]
    fn rounds_to_nearest_cent_away_from_zero() {
        assert_eq!(money("0.005").cents(), 1);
        assert_eq!(money("0.004").cents(), 0);
        assert_eq!(money("-0.005").cents(), -1);
        assert_eq!(round2(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!("ten".parse::<Money>(), Err(MoneyError::Parse(_))));
        assert!(matches!(
            Money::from_decimal(Decimal::MAX),
            Err(MoneyError::OutOfRange(_))
        ));
    }

    #[test]
    fn apply_rate_rounds_result() {
        assert_eq!(money("10.00").apply_rate(dec!(0.05)).unwrap(), money("0.50"));
        assert_eq!(money("50.00").apply_rate(dec!(0.08)).unwrap(), money("4.00"));
        // 0.08 * 0.06 = 0.0048 rounds to 0.00
        assert_eq!(money("0.06").apply_rate(dec!(0.08)).unwrap(), Money::ZERO);
        // 0.08 * 0.07 = 0.0056 rounds to 0.01
        assert_eq!(money("0.07").apply_rate(dec!(0.08)).unwrap(), money("0.01"));
    }

    #[test]
    fn repeated_additions_do_not_drift() {
        let mut total = Money::ZERO;
        for _ in 0..1000 {
            total = total.checked_add(money("0.10")).unwrap();
        }
        assert_eq!(total, money("100.00"));
    }

    #[test]
    fn checked_arithmetic_detects_overflow() {
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
    }

    #[test]
    fn serde_uses_decimal_strings_and_accepts_numbers() {
        assert_eq!(serde_json::to_string(&money("46")).unwrap(), "\"46.00\"");
        let from_number: Money = serde_json::from_str("46.1").unwrap();
        assert_eq!(from_number, money("46.10"));
        let from_string: Money = serde_json::from_str("\"0.333\"").unwrap();
        assert_eq!(from_string, money("0.33"));
    }
}
