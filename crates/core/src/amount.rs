//! TokenAmount - Non-negative whole-unit token quantity
//!
//! Relief tokens are indivisible units. Every quantity in GRUHA MUST be
//! a non-negative integer; this is enforced at the type level. Amounts
//! serialize as strings over JSON so callers never round-trip them
//! through IEEE-754 doubles.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when working with token amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Amount must be a whole number of tokens: {0}")]
    FractionalAmount(Decimal),
}

/// A non-negative whole-unit token amount.
///
/// # Invariant
/// The inner value is always >= 0 and has no fractional part.
/// This is enforced by the constructor.
///
/// # Example
/// ```
/// use gruha_core::TokenAmount;
/// use rust_decimal::Decimal;
///
/// let amount = TokenAmount::new(Decimal::new(2500, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(2500, 0));
///
/// // Negative amounts are rejected
/// assert!(TokenAmount::new(Decimal::new(-1, 0)).is_err());
/// // Fractional amounts are rejected
/// assert!(TokenAmount::new(Decimal::new(15, 1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TokenAmount(Decimal);

impl TokenAmount {
    /// Zero amount constant
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new TokenAmount from a Decimal.
    ///
    /// Returns an error if the value is negative or fractional.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            Err(AmountError::NegativeAmount(value))
        } else if !value.fract().is_zero() {
            Err(AmountError::FractionalAmount(value))
        } else {
            Ok(Self(value.normalize()))
        }
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: &TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(other.0).map(TokenAmount)
    }

    /// Checked subtraction - returns None if the result would be negative
    pub fn checked_sub(&self, other: &TokenAmount) -> Option<TokenAmount> {
        let result = self.0.checked_sub(other.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(TokenAmount(result))
        }
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for TokenAmount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TokenAmount> for Decimal {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(Decimal::from(value))
    }
}

impl Default for TokenAmount {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_positive() {
        let amount = TokenAmount::new(Decimal::new(100, 0)).unwrap();
        assert_eq!(amount.value(), Decimal::new(100, 0));
    }

    #[test]
    fn test_amount_zero() {
        let amount = TokenAmount::new(Decimal::ZERO).unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_amount_negative_rejected() {
        let result = TokenAmount::new(Decimal::new(-100, 0));
        assert!(matches!(result, Err(AmountError::NegativeAmount(_))));
    }

    #[test]
    fn test_amount_fractional_rejected() {
        let result = TokenAmount::new(Decimal::new(105, 1)); // 10.5
        assert!(matches!(result, Err(AmountError::FractionalAmount(_))));
    }

    #[test]
    fn test_checked_sub_prevents_negative() {
        let a = TokenAmount::from(50);
        let b = TokenAmount::from(100);
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn test_checked_sub_success() {
        let a = TokenAmount::from(100);
        let b = TokenAmount::from(30);
        let result = a.checked_sub(&b).unwrap();
        assert_eq!(result, TokenAmount::from(70));
    }

    #[test]
    fn test_checked_add() {
        let a = TokenAmount::from(7_500);
        let b = TokenAmount::from(2_500);
        assert_eq!(a.checked_add(&b).unwrap(), TokenAmount::from(10_000));
    }

    #[test]
    fn test_serde_as_string() {
        let amount = TokenAmount::from(10_000);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"10000\"");

        let parsed: TokenAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, parsed);
    }

    #[test]
    fn test_serde_rejects_negative() {
        let result: Result<TokenAmount, _> = serde_json::from_str("\"-5\"");
        assert!(result.is_err());
    }
}
