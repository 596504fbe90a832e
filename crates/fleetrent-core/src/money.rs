//! # Money Module
//!
//! Provides the `Money` type for settlement-currency amounts.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Rental cost = days × rate (UF) × UF value (CLP)                        │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    3 × 1.1 × 38416.69 = 126775.07699999999  ❌ drift                    │
//! │                                                                         │
//! │  OUR SOLUTION: Exact decimals, rounded ONCE                             │
//! │    3 × 1.1 × 38416.69 = 126775.077 → round half-up → 126775 CLP         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Indicator values carry fractional digits (UF is published with two
//! decimals) so the integer-cents trick does not apply to the factors. Only
//! the final product is rounded to the settlement currency's minor units.
//!
//! ## Usage
//! ```rust
//! use fleetrent_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let raw = Money::new(Decimal::new(1267750770, 4)); // 126775.0770
//! assert_eq!(raw.rounded(0).amount(), Decimal::from(126_775));
//! ```

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// =============================================================================
// Money Type
// =============================================================================

/// A settlement-currency amount.
///
/// ## Design Decisions
/// - **Decimal**: exact base-10 arithmetic, no binary drift
/// - **Unrounded until asked**: [`Money::rounded`] is the single rounding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// The underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Rounds to `minor_units` fractional digits, half away from zero.
    ///
    /// ## Rounding Rule
    /// ```text
    /// minor_units = 0 (CLP):   126775.5  → 126776
    ///                          126775.49 → 126775
    /// minor_units = 2 (USD):   10.005    → 10.01
    /// ```
    pub fn rounded(&self, minor_units: u32) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(minor_units, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up_whole_units() {
        assert_eq!(Money::new(dec!(126775.5)).rounded(0).amount(), dec!(126776));
        assert_eq!(Money::new(dec!(126775.49)).rounded(0).amount(), dec!(126775));
        assert_eq!(Money::new(dec!(2.5)).rounded(0).amount(), dec!(3));
    }

    #[test]
    fn test_round_half_up_cents() {
        assert_eq!(Money::new(dec!(10.005)).rounded(2).amount(), dec!(10.01));
        assert_eq!(Money::new(dec!(10.004)).rounded(2).amount(), dec!(10.00));
    }

    #[test]
    fn test_rounding_is_not_bankers() {
        // Banker's rounding would give 2
        assert_eq!(Money::new(dec!(2.5)).rounded(0).amount(), dec!(3));
        assert_eq!(Money::new(dec!(-2.5)).rounded(0).amount(), dec!(-3));
    }

    #[test]
    fn test_already_rounded_is_unchanged() {
        assert_eq!(Money::new(dec!(222000)).rounded(0).amount(), dec!(222000));
        assert_eq!(Money::new(dec!(99.50)).rounded(2).amount(), dec!(99.50));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(dec!(222000)).to_string(), "222000");
    }
}
