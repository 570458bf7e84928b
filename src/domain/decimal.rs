//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Token amounts, unit prices and USD values all flow through this type so that
//! summing records never drifts and summation order never changes a total.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless decimal numeric type for token and currency amounts.
///
/// Serializes to a JSON number (not string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Create a Decimal from a RustDecimal.
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Parse plain or scientific notation (`"1e-7"`, `"2.5E3"`).
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        RustDecimal::from_str(s)
            .or_else(|_| RustDecimal::from_scientific(s))
            .ok()
            .map(Decimal)
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    /// Format with exactly `dp` fractional digits, rounding half away from zero.
    pub fn to_fixed(&self, dp: u32) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        format!("{:.*}", dp as usize, rounded)
    }

    /// Get the underlying RustDecimal.
    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    /// Returns the value 100.
    pub fn hundred() -> Self {
        Decimal(RustDecimal::ONE_HUNDRED)
    }

    /// Division that yields `None` for a zero divisor or overflow.
    pub fn checked_div(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
    }

    /// Clamp into `[lo, hi]`.
    pub fn clamp_to(&self, lo: Decimal, hi: Decimal) -> Decimal {
        if *self < lo {
            lo
        } else if *self > hi {
            hi
        } else {
            *self
        }
    }

    /// Addition that yields `None` on overflow.
    pub fn checked_add(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    /// Multiplication that yields `None` on overflow.
    pub fn checked_mul(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    /// `self` interpreted as a percentage of `value` (`value * self / 100`).
    ///
    /// Near the top of the range the division happens first; the result
    /// saturates rather than overflowing.
    pub fn percent_of(&self, value: Decimal) -> Decimal {
        value
            .0
            .checked_mul(self.0)
            .map(|product| product / RustDecimal::ONE_HUNDRED)
            .or_else(|| (value.0 / RustDecimal::ONE_HUNDRED).checked_mul(self.0))
            .map(Decimal)
            .unwrap_or_else(|| Decimal((value.0 / RustDecimal::ONE_HUNDRED).saturating_mul(self.0)))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

// Operators saturate at the representable range instead of panicking.
// Aggregation uses the checked forms to detect and skip overflow.
impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_mul(rhs.0))
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl std::iter::Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_decimal_canonical_drops_trailing_zeros() {
        assert_eq!(d("100.500").to_canonical_string(), "100.5");
        assert_eq!(d("0").to_canonical_string(), "0");
    }

    #[test]
    fn test_decimal_lenient_accepts_scientific() {
        assert_eq!(Decimal::from_str_lenient("1e-7"), Some(d("0.0000001")));
        assert_eq!(Decimal::from_str_lenient("2.5E3"), Some(d("2500")));
        assert_eq!(Decimal::from_str_lenient("12.5"), Some(d("12.5")));
        assert_eq!(Decimal::from_str_lenient("abc"), None);
    }

    #[test]
    fn test_decimal_to_fixed_rounds_half_away_from_zero() {
        assert_eq!(d("5").to_fixed(2), "5.00");
        assert_eq!(d("0.625").to_fixed(2), "0.63");
        assert_eq!(d("-0.625").to_fixed(2), "-0.63");
        assert_eq!(d("0.05").to_fixed(6), "0.050000");
    }

    #[test]
    fn test_decimal_checked_div_zero() {
        assert_eq!(d("10").checked_div(Decimal::zero()), None);
        assert_eq!(d("10").checked_div(d("4")), Some(d("2.5")));
    }

    #[test]
    fn test_decimal_percent_of() {
        assert_eq!(d("50").percent_of(d("200")), d("100"));
        assert_eq!(d("12.5").percent_of(d("80")), d("10"));
    }

    #[test]
    fn test_decimal_clamp() {
        assert_eq!(d("150").clamp_to(Decimal::zero(), Decimal::hundred()), d("100"));
        assert_eq!(d("-3").clamp_to(Decimal::zero(), Decimal::hundred()), d("0"));
        assert_eq!(d("42").clamp_to(Decimal::zero(), Decimal::hundred()), d("42"));
    }

    #[test]
    fn test_decimal_sum_is_order_independent() {
        let values = vec![d("0.1"), d("0.2"), d("0.3"), d("1000.0001")];
        let forward: Decimal = values.iter().copied().sum();
        let backward: Decimal = values.iter().rev().copied().sum();
        assert_eq!(forward, backward);
        assert_eq!(forward, d("1000.6001"));
    }

    #[test]
    fn test_decimal_json_serialization() {
        let decimal = d("123.456");
        let json = serde_json::to_value(decimal).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.456");
    }

    #[test]
    fn test_checked_ops_report_overflow() {
        let big = Decimal::new(RustDecimal::MAX);
        assert_eq!(big.checked_add(d("1")), None);
        assert_eq!(big.checked_mul(d("2")), None);
        assert_eq!(d("2").checked_add(d("3")), Some(d("5")));
        assert_eq!(d("1.5").checked_mul(d("4")), Some(d("6")));
    }

    #[test]
    fn test_operators_saturate_instead_of_panicking() {
        let big = d("60000000000000000000000000000");
        assert_eq!(big + big, Decimal::new(RustDecimal::MAX));
        assert_eq!(big * d("10"), Decimal::new(RustDecimal::MAX));
        assert_eq!(-big - big, Decimal::new(RustDecimal::MIN));
    }

    #[test]
    fn test_percent_of_near_max_does_not_overflow() {
        let big = d("60000000000000000000000000000");
        assert_eq!(d("50").percent_of(big), d("30000000000000000000000000000"));
        assert_eq!(d("50").percent_of(d("10")), d("5"));
    }
}
