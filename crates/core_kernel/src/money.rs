//! Money and rate types with precise decimal arithmetic
//!
//! This module provides the monetary value types used across the billing
//! engine. Amounts are plain decimal rupees (display units, not integer
//! paise) backed by rust_decimal, so the reconciliation invariants hold as
//! exact identities rather than floating-point approximations.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

/// A monetary amount in rupees.
///
/// `Money` is a thin wrapper over [`Decimal`]. Construction never rounds:
/// derived figures such as tax amounts keep their exact value, and only
/// [`fmt::Display`] rounds (to two decimal places) for presentation.
///
/// Amounts entered by a user are coerced through [`Money::parse_lenient`],
/// which maps malformed or negative input to zero instead of failing. The
/// data-entry form may be mid-edit and must never crash on a blank input
/// box.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a new amount from an exact decimal value.
    ///
    /// Accepts any decimal, including negative values: a discount larger
    /// than a bill legitimately produces a negative total.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates an amount from a whole number of rupees.
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::new(rupees, 0))
    }

    /// Returns the underlying decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds to whole paise (two decimal places) for presentation.
    pub fn rounded(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Parses user-entered text into an amount, coercing failures to zero.
    ///
    /// The billing form allows free typing in its numeric fields, so this
    /// is deliberately total: blank input, non-numeric text, and negative
    /// values (the inputs are defined non-negative) all coerce to zero.
    pub fn parse_lenient(input: &str) -> Self {
        match input.trim().parse::<Decimal>() {
            Ok(value) if value.is_sign_positive() => Self(value),
            _ => Self::ZERO,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.0.round_dp(2))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        Self(self.0 * factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// A percentage rate, stored as the percentage figure itself.
///
/// A rate of `18` means 18%: applying it to an amount yields
/// `amount * 18 / 100`. This matches how the tax catalog records rates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    /// The zero rate.
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// Creates a rate from a percentage figure (e.g. `18` for 18%).
    pub fn from_percent(percent: Decimal) -> Self {
        Self(percent)
    }

    /// Returns the percentage figure.
    pub fn percent(&self) -> Decimal {
        self.0
    }

    /// Applies this rate to an amount: `amount * percent / 100`, exact.
    pub fn apply(&self, amount: Money) -> Money {
        Money::new(amount.amount() * self.0 / dec!(100))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Lenient wire value accepted for monetary and rate fields.
///
/// The persistence collaborator is a schemaless store: numeric fields
/// arrive as numbers, numeric strings, `null`, or occasionally something
/// else entirely. Every shape coerces rather than erroring.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(Decimal),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl LenientNumber {
    fn coerce(raw: Option<LenientNumber>) -> Decimal {
        match raw {
            Some(LenientNumber::Number(value)) if value.is_sign_positive() => value,
            Some(LenientNumber::Text(text)) => Money::parse_lenient(&text).amount(),
            _ => Decimal::ZERO,
        }
    }
}

/// Deserializes a wire field into [`Money`] under the coercion policy.
///
/// Intended for `#[serde(default, deserialize_with = "lenient_money")]`
/// on wire DTO fields.
pub fn lenient_money<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(Money::new(LenientNumber::coerce(raw)))
}

/// Deserializes a wire field into [`Rate`] under the coercion policy.
pub fn lenient_rate<'de, D>(deserializer: D) -> Result<Rate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(Rate::from_percent(LenientNumber::coerce(raw)))
}
