use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// A decimal currency amount, in pounds.
///
/// Order totals flow in from browser clients and payment processor notifications as decimal
/// amounts, so equality over `Money` is almost never exact. [`Money::approx_eq`] is the
/// comparison that every reconciliation rule uses; [`Money::EPSILON`] is the tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize, Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Money(pub(crate) f64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(unary Money, Neg, neg);

impl Money {
    /// Two amounts closer together than this are the same amount.
    ///
    /// The bound is strict on the stored `f64` difference, so amounts exactly one penny
    /// apart usually compare equal once float rounding shaves the difference below 0.01.
    pub const EPSILON: f64 = 0.01;
    pub const ZERO: Money = Money(0.0);

    pub fn value(&self) -> f64 {
        self.0
    }

    /// True if the two amounts differ by less than [`Money::EPSILON`].
    pub fn approx_eq(&self, other: Money) -> bool {
        (self.0 - other.0).abs() < Self::EPSILON
    }

    /// True if this amount is (approximately) the sum of the two parts.
    pub fn is_sum_of(&self, a: Money, b: Money) -> bool {
        self.approx_eq(a + b)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a currency amount: {0}")]
pub struct MoneyConversionError(String);

impl From<f64> for Money {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self(value as f64)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('£');
        trimmed.parse::<f64>().map(Money).map_err(|e| MoneyConversionError(format!("{s}: {e}")))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "£{:0.2}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arithmetic() {
        let subtotal = Money::from(42.5);
        let shipping = Money::from(4.99);
        let total = subtotal + shipping;
        assert!(total.approx_eq(Money::from(47.49)));
        assert!(total.is_sum_of(subtotal, shipping));
        assert_eq!((-shipping).value(), -4.99);
        let mut acc = Money::ZERO;
        acc += subtotal;
        acc += subtotal;
        assert!(acc.approx_eq(Money::from(85.0)));
    }

    #[test]
    fn epsilon_is_a_strict_bound() {
        let a = Money::from(10.00);
        assert!(a.approx_eq(Money::from(10.009)));
        // A one-penny gap lands on the tolerance boundary and rounds inside it.
        assert!(a.approx_eq(Money::from(10.01)));
        assert!(a.approx_eq(Money::from(9.99)));
        // Two pennies are reliably outside.
        assert!(!a.approx_eq(Money::from(10.02)));
        assert!(!a.approx_eq(Money::from(9.98)));
    }

    #[test]
    fn parse_and_display() {
        let m = "£47.49".parse::<Money>().unwrap();
        assert!(m.approx_eq(Money::from(47.49)));
        assert_eq!(m.to_string(), "£47.49");
        assert!("not money".parse::<Money>().is_err());
    }
}
