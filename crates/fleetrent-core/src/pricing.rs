//! # Rental Pricing
//!
//! Turns a date range, a daily rate in indicator units and a resolved quote
//! into a settlement-currency cost.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  start_date, end_date ──► day_count = end - start   (must be > 0)       │
//! │                                  │                                      │
//! │  daily_rate (UF/day) ────────────┤  (must be > 0)                       │
//! │                                  ▼                                      │
//! │  quote.value (CLP/UF) ──► raw = day_count × rate × value   (exact)      │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                        total = round_half_up(raw, minor_units)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Intermediate factors are never rounded. The engine is pure: no I/O, no
//! clock, no mutation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::PricingError;
use crate::money::Money;
use crate::types::IndicatorQuote;

// =============================================================================
// Pricing Result
// =============================================================================

/// Full cost breakdown, retained so the caller can persist it for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingResult {
    pub day_count: i64,
    /// Indicator units per day.
    pub daily_rate: Decimal,
    pub quote_value: Decimal,
    /// Date of the quote actually used (may precede the start date).
    pub quote_date: NaiveDate,
    /// Rounded settlement-currency amount.
    pub total_cost: Money,
}

// =============================================================================
// Pricing Engine
// =============================================================================

/// Computes rental costs for a settlement currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalPricingEngine {
    minor_units: u32,
}

impl Default for RentalPricingEngine {
    /// Chilean peso: no minor units.
    fn default() -> Self {
        Self::new(0)
    }
}

impl RentalPricingEngine {
    /// Creates an engine rounding to `minor_units` fractional digits.
    pub const fn new(minor_units: u32) -> Self {
        Self { minor_units }
    }

    pub const fn minor_units(&self) -> u32 {
        self.minor_units
    }

    /// Prices a rental.
    ///
    /// ## Errors
    /// - `InvalidDateRange` when `end <= start` (same-day is not zero-cost)
    /// - `InvalidDailyRate` when `daily_rate <= 0`
    /// - `Overflow` when the product leaves decimal range
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use fleetrent_core::{IndicatorQuote, RentalPricingEngine};
    ///
    /// let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
    /// let quote = IndicatorQuote::new("uf", start, Decimal::new(3841669, 2)).unwrap();
    ///
    /// let result = RentalPricingEngine::new(0)
    ///     .price(start, end, Decimal::ONE, &quote)
    ///     .unwrap();
    /// assert_eq!(result.total_cost.amount(), Decimal::from(38_417));
    /// ```
    pub fn price(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        daily_rate: Decimal,
        quote: &IndicatorQuote,
    ) -> Result<PricingResult, PricingError> {
        let day_count = (end - start).num_days();
        if day_count <= 0 {
            return Err(PricingError::InvalidDateRange { start, end });
        }
        if daily_rate <= Decimal::ZERO {
            return Err(PricingError::InvalidDailyRate(daily_rate));
        }

        let raw = Decimal::from(day_count)
            .checked_mul(daily_rate)
            .and_then(|units| units.checked_mul(quote.value()))
            .ok_or(PricingError::Overflow)?;

        Ok(PricingResult {
            day_count,
            daily_rate,
            quote_value: quote.value(),
            quote_date: quote.date(),
            total_cost: Money::new(raw).rounded(self.minor_units),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
