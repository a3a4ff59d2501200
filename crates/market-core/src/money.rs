//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing a cart in floating point:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    10 + 20 = 30 cents, every time                                       │
//! │                                                                         │
//! │  Floats only appear at the durable boundary, where the stored snapshot  │
//! │  carries prices as JSON numbers in major units (see [`serde_major`]).   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use market_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line_total = price * 2;          // $21.98
//! assert_eq!(line_total.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Arithmetic saturates at the `i64` bounds instead of overflowing.
///
/// ## Where Money is Used
/// ```text
/// ProductDescriptor.price ──► LineItem.price ──► line_total (× quantity)
///                                                     │
///                                                     ▼
///                                            CartTotals.sum (Σ line totals)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts an amount in major units (e.g. `12.99`) to Money, rounding to
    /// the nearest cent.
    ///
    /// Only used at the durable boundary. Returns `None` for NaN, infinities
    /// and values that do not fit in i64 cents.
    ///
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(12.99).unwrap().cents(), 1299);
    /// assert_eq!(Money::from_major(10.0).unwrap().cents(), 1000);
    /// assert!(Money::from_major(f64::NAN).is_none());
    /// ```
    pub fn from_major(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }

        let cents = (amount * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }

        Some(Money(cents as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value in major units, for display and encoding only.
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable format for logs and the terminal front-end.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Major-Unit Serde Adapter
// =============================================================================

/// Serializes Money as a JSON number in major units.
///
/// This is the encoding the mobile client has always written for `price`:
/// whole amounts as integers (`10`), others as decimals (`12.99`).
/// Decoding rejects negative and non-finite values, and prices above
/// [`MAX_PRICE_CENTS`](crate::MAX_PRICE_CENTS).
///
/// ```rust
/// use market_core::money::{serde_major, Money};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Priced {
///     #[serde(with = "serde_major")]
///     price: Money,
/// }
///
/// let json = serde_json::to_string(&Priced { price: Money::from_cents(1299) }).unwrap();
/// assert_eq!(json, r#"{"price":12.99}"#);
/// ```
pub mod serde_major {
    use super::Money;
    use crate::MAX_PRICE_CENTS;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        if money.cents() % 100 == 0 {
            serializer.serialize_i64(money.dollars())
        } else {
            serializer.serialize_f64(money.to_major())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let (amount, money) = non_negative(deserializer)?;

        if money.cents() > MAX_PRICE_CENTS {
            return Err(D::Error::custom(format!("price {} exceeds the maximum", amount)));
        }

        Ok(money)
    }

    /// Like [`deserialize`] without the unit-price ceiling, for totals.
    pub fn deserialize_total<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        non_negative(deserializer).map(|(_, money)| money)
    }

    fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(f64, Money), D::Error> {
        let amount = f64::deserialize(deserializer)?;
        let money = Money::from_major(amount)
            .ok_or_else(|| D::Error::custom(format!("price {} is not a finite amount", amount)))?;

        if money.is_negative() {
            return Err(D::Error::custom(format!("price {} is negative", amount)));
        }

        Ok((amount, money))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "serde_major")]
        price: Money,
    }

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_from_major_rounds_to_nearest_cent() {
        assert_eq!(Money::from_major(0.1).unwrap().cents(), 10);
        assert_eq!(Money::from_major(12.99).unwrap().cents(), 1299);
        assert_eq!(Money::from_major(19.999).unwrap().cents(), 2000);
        assert!(Money::from_major(f64::INFINITY).is_none());
    }

    #[test]
    fn test_serde_major_writes_integers_for_whole_amounts() {
        let whole = serde_json::to_string(&Priced { price: Money::from_cents(1000) }).unwrap();
        assert_eq!(whole, r#"{"price":10}"#);

        let fractional = serde_json::to_string(&Priced { price: Money::from_cents(1050) }).unwrap();
        assert_eq!(fractional, r#"{"price":10.5}"#);
    }

    #[test]
    fn test_serde_major_reads_integers_and_decimals() {
        let p: Priced = serde_json::from_str(r#"{"price":10}"#).unwrap();
        assert_eq!(p.price.cents(), 1000);

        let p: Priced = serde_json::from_str(r#"{"price":3.49}"#).unwrap();
        assert_eq!(p.price.cents(), 349);
    }

    #[test]
    fn test_serde_major_rejects_negative_price() {
        let result: Result<Priced, _> = serde_json::from_str(r#"{"price":-1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_major_rejects_price_above_maximum() {
        let result: Result<Priced, _> = serde_json::from_str(r#"{"price":90000000000000000}"#);
        assert!(result.is_err());

        let p: Priced = serde_json::from_str(r#"{"price":10000000}"#).unwrap();
        assert_eq!(p.price.cents(), crate::MAX_PRICE_CENTS);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);

        assert_eq!(max.multiply_quantity(2).cents(), i64::MAX);
        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);

        let total: Money = vec![max, max, max].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }
}
