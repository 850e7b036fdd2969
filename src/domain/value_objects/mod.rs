//! Value Objects for the storefront

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use uuid::Uuid;

/// Money value object.
///
/// The storefront trades in a single currency, so only the amount is carried.
/// Amounts are stored as `NUMERIC(10,2)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self { Self(amount) }
    /// `Money::from_cents(9900)` is 99.00.
    pub fn from_cents(cents: i64) -> Self { Self(Decimal::new(cents, 2)) }
    pub fn multiply(&self, qty: i32) -> Money { Money(self.0 * Decimal::from(qty)) }
}

impl Add for Money {
    type Output = Money;
    fn add(self, other: Money) -> Money { Money(self.0 + other.0) }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money { iter.fold(Money::ZERO, Add::add) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse().map(Self) }
}

/// Opaque token naming an anonymous cart.
///
/// Issued at the request boundary; the cart and checkout managers only ever key on it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(String);

impl CartId {
    pub const MAX_LEN: usize = 64;

    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

    /// Accepts a presented token if it looks like one we could have issued.
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = !value.is_empty()
            && value.len() <= Self::MAX_LEN
            && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        well_formed.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Human-referenceable order number, `EV-{yyyyMMdd}-{8 uppercase hex chars}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub const PREFIX: &'static str = "EV";

    pub fn generate(at: DateTime<Utc>) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        let suffix = token[..8].to_uppercase();
        Self(format!("{}-{}-{}", Self::PREFIX, at.format("%Y%m%d"), suffix))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_money_sum() {
        let lines = [Money::from_cents(9900).multiply(2), Money::from_cents(19900)];
        let subtotal: Money = lines.into_iter().sum();
        assert_eq!(subtotal, Money::from_cents(39700));
        assert_eq!((subtotal + Money::from_cents(1000)).to_string(), "407.00");
    }

    #[test]
    fn test_cart_id_parse() {
        assert!(CartId::parse("6f1c2a9e-1b7d-4a53-9d54-0c6a3f7e8b21").is_some());
        assert!(CartId::parse("").is_none());
        assert!(CartId::parse("abc;def").is_none());
        assert!(CartId::parse(&"a".repeat(CartId::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn test_order_number_format() {
        let at = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        let number = OrderNumber::generate(at);
        let parts: Vec<&str> = number.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "EV");
        assert_eq!(parts[1], "20240603");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_order_numbers_distinct_same_day() {
        let at = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        assert_ne!(OrderNumber::generate(at), OrderNumber::generate(at));
    }
}
