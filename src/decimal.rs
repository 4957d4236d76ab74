//! Fixed-point decimal type with 2 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement so monetary values
//! stay currency-exact, without floating-point errors. Values carrying more
//! than 2 fractional digits are rounded half-up on construction.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// A decimal type that maintains exactly 2 decimal places of precision.
///
/// This type wraps `rust_decimal::Decimal` and ensures consistent scale
/// for all arithmetic operations, suitable for monetary calculations.
/// Construction rounds half-up (away from zero on ties), matching how
/// currency amounts and running averages are rounded throughout the ledger.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use bank_ledger::Decimal2;
///
/// let amount = Decimal2::from_str("10.5").unwrap();
/// assert_eq!(amount.to_string(), "10.50");
///
/// let rounded = Decimal2::from_str("10.005").unwrap();
/// assert_eq!(rounded.to_string(), "10.01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Decimal2(Decimal);

impl Decimal2 {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Decimal2(Decimal::ZERO);

    /// Creates a new `Decimal2` from a `Decimal`, rounding half-up to 2 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized =
            value.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        normalized.rescale(Self::SCALE);
        Decimal2(normalized)
    }

    /// Returns the wrapped `Decimal` for calculations that need intermediate
    /// precision (ratios, incremental means). Callers re-normalize results
    /// through [`Decimal2::new`].
    pub fn inner(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this value is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl From<Decimal> for Decimal2 {
    fn from(value: Decimal) -> Self {
        Decimal2::new(value)
    }
}

impl FromStr for Decimal2 {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)?;
        Ok(Decimal2::new(decimal))
    }
}

impl fmt::Display for Decimal2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Decimal2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Decimal2::new(self.0 + rhs.0)
    }
}

impl AddAssign for Decimal2 {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Sub for Decimal2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Decimal2::new(self.0 - rhs.0)
    }
}

impl SubAssign for Decimal2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Serialize for Decimal2 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:.2}", self.0))
    }
}

impl<'de> Deserialize<'de> for Decimal2 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Decimal2::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_normalizes_scale() {
        let d = Decimal2::from_str("1").unwrap();
        assert_eq!(d.to_string(), "1.00");

        let d = Decimal2::from_str("1.5").unwrap();
        assert_eq!(d.to_string(), "1.50");

        let d = Decimal2::from_str("1.12").unwrap();
        assert_eq!(d.to_string(), "1.12");

        let d = Decimal2::from_str("  2.5  ").unwrap();
        assert_eq!(d.to_string(), "2.50");
    }

    #[test]
    fn test_rounds_half_up() {
        let d = Decimal2::from_str("1.005").unwrap();
        assert_eq!(d.to_string(), "1.01");

        let d = Decimal2::from_str("1.004").unwrap();
        assert_eq!(d.to_string(), "1.00");

        let d = Decimal2::from_str("-1.005").unwrap();
        assert_eq!(d.to_string(), "-1.01");
    }

    #[test]
    fn test_arithmetic_preserves_scale() {
        let a = Decimal2::from_str("1.5").unwrap();
        let b = Decimal2::from_str("2.5").unwrap();

        assert_eq!((a + b).to_string(), "4.00");
        assert_eq!((b - a).to_string(), "1.00");
    }

    #[test]
    fn test_zero_constant() {
        assert!(Decimal2::ZERO.is_zero());
        assert!(!Decimal2::ZERO.is_positive());
    }

    #[test]
    fn test_is_positive() {
        assert!(Decimal2::from_str("0.01").unwrap().is_positive());
        assert!(!Decimal2::from_str("-0.01").unwrap().is_positive());
    }

    #[test]
    fn test_negative_values() {
        let positive = Decimal2::from_str("1.0").unwrap();
        let negative = Decimal2::from_str("-1.0").unwrap();

        assert_eq!((positive - negative).to_string(), "2.00");
        assert_eq!((negative - positive).to_string(), "-2.00");
    }
}
