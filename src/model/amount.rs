//! Amount type for handling the money value of an expense.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It is written to the wire as a
//! JSON number and is accepted from the wire as either a JSON number or a numeric string.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Represents a currency-agnostic amount of money.
///
/// Equality and ordering are numeric, so `50` and `50.00` are equal.
///
/// # Examples
///
/// ```
/// # use expense_sync::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "1,250.50");
/// assert!(amount.ensure_persistable().is_ok());
/// ```
///
/// Negative amounts parse, but they may not be sent to the remote service:
/// ```
/// # use expense_sync::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-5").unwrap();
/// assert!(amount.ensure_persistable().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// An amount of zero.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Returns the amount as a float for display math such as percentages.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Checks that this amount may be persisted: it must not be negative. A `Decimal` is always
    /// finite, so non-finite input is rejected earlier, when it is parsed or decoded.
    pub fn ensure_persistable(&self) -> Result<(), AmountError> {
        if self.is_negative() {
            return Err(AmountError::Negative(self.0));
        }
        Ok(())
    }
}

/// An error that can occur when parsing or validating an `Amount`.
pub enum AmountError {
    /// The text could not be parsed as a decimal number.
    Parse(rust_decimal::Error),
    /// The value is a float that has no decimal representation (NaN, infinity, or out of range).
    NotFinite(f64),
    /// The value is below zero.
    Negative(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Parse(e) => write!(f, "Invalid amount: {e}"),
            AmountError::NotFinite(v) => write!(f, "Amount {v} is not a finite number"),
            AmountError::Negative(v) => write!(f, "Amount {v} is negative, amounts must be zero or more"),
        }
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Thousands separators are accepted and dropped
        let cleaned = s.trim().replace(',', "");
        let value = Decimal::from_str(&cleaned).map_err(AmountError::Parse)?;
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.0.abs().to_f64().unwrap_or_default();
        write!(f, "{sign}{}", format_num::format_num!(",.2", num))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + *a)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.to_i64() {
            Some(whole) if self.0.fract().is_zero() => serializer.serialize_i64(whole),
            _ => serializer.serialize_f64(self.to_f64()),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Decimal::from_f64(v)
            .map(Amount)
            .ok_or_else(|| E::custom(AmountError::NotFinite(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.25").unwrap();
        assert_eq!(amount.value(), dec("50.25"));
    }

    #[test]
    fn test_parse_with_commas_and_whitespace() {
        let amount = Amount::from_str("  1,234,567.89 ").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(Amount::from_str("twelve").is_err());
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_str("50").unwrap().to_string(), "50.00");
        assert_eq!(Amount::from_str("1234.5").unwrap().to_string(), "1,234.50");
        assert_eq!(Amount::from_str("-20").unwrap().to_string(), "-20.00");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_numeric_equality() {
        let a = Amount::from_str("50").unwrap();
        let b = Amount::from_str("50.00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_persistable() {
        assert!(Amount::ZERO.ensure_persistable().is_ok());
        assert!(Amount::from_str("0.01").unwrap().ensure_persistable().is_ok());
        let err = Amount::from_str("-0.01")
            .unwrap()
            .ensure_persistable()
            .unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_serialize_as_number() {
        let whole = Amount::from_str("50.00").unwrap();
        assert_eq!(serde_json::to_string(&whole).unwrap(), "50");
        let cents = Amount::from_str("12.5").unwrap();
        assert_eq!(serde_json::to_string(&cents).unwrap(), "12.5");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: Amount = serde_json::from_str("20").unwrap();
        assert_eq!(a.value(), dec("20"));
        let b: Amount = serde_json::from_str("19.99").unwrap();
        assert_eq!(b.value(), dec("19.99"));
        let c: Amount = serde_json::from_str("\"7.50\"").unwrap();
        assert_eq!(c.value(), dec("7.5"));
    }

    #[test]
    fn test_deserialize_rejects_non_numbers() {
        assert!(serde_json::from_str::<Amount>("true").is_err());
        assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Amount::from_str("1.10").unwrap(),
            Amount::from_str("2.20").unwrap(),
        ];
        let total: Amount = amounts.iter().sum();
        assert_eq!(total.value(), dec("3.30"));
    }
}
