//! Money type with precise decimal arithmetic
//!
//! Bill amounts and payments are bookkept in a single currency (rupees),
//! matching the `decimal(10,2)` columns of the compliance ledger. The type
//! uses rust_decimal so that running balances never accumulate
//! floating-point error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

/// Decimal places used for all bookkeeping amounts.
pub const MONEY_PRECISION: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount in the ledger's bookkeeping currency
///
/// Amounts are stored rounded to 2 decimal places. Balances may legally be
/// negative (an overpaid document), so `Money` is a full signed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new amount, rounding to bookkeeping precision
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp(MONEY_PRECISION))
    }

    /// The zero amount
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Creates an amount from whole rupees
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::new(rupees, 0))
    }

    /// Creates an amount from paise (minor units)
    pub fn from_paise(paise: i64) -> Self {
        Self(Decimal::new(paise, MONEY_PRECISION))
    }

    /// Returns the underlying decimal amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Money::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Money::new)
            .ok_or(MoneyError::Overflow)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Decimal {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation_rounds() {
        let m = Money::new(dec!(100.555));
        assert_eq!(m.amount(), dec!(100.56));
    }

    #[test]
    fn test_money_from_paise() {
        let m = Money::from_paise(10050);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(5000));
        let b = Money::new(dec!(3500));

        assert_eq!((a - b).amount(), dec!(1500));
        assert_eq!((a + b).amount(), dec!(8500));
    }

    #[test]
    fn test_negative_balance_allowed() {
        let balance = Money::zero() - Money::new(dec!(500));
        assert!(balance.is_negative());
        assert_eq!(balance.amount(), dec!(-500));
    }

    #[test]
    fn test_money_sum() {
        let payments = vec![Money::from_rupees(2000), Money::from_rupees(1500)];
        let total: Money = payments.into_iter().sum();
        assert_eq!(total.amount(), dec!(3500));
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(dec!(1234.5));
        assert_eq!(m.to_string(), "₹1234.50");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_sum_is_order_independent(
            mut amounts in proptest::collection::vec(-1_000_000i64..1_000_000i64, 0..20)
        ) {
            let forward: Money = amounts.iter().map(|p| Money::from_paise(*p)).sum();
            amounts.reverse();
            let backward: Money = amounts.iter().map(|p| Money::from_paise(*p)).sum();
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn money_add_sub_round_trip(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_paise(a);
            let mb = Money::from_paise(b);
            prop_assert_eq!((ma + mb) - mb, ma);
        }
    }
}
