//! # Error Types
//!
//! Domain-specific error types for fleetrent-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fleetrent-core errors (this file)                                      │
//! │  ├── IndicatorError   - Quote resolution failures                       │
//! │  ├── PricingError     - Cost computation failures                       │
//! │  ├── TransitionError  - Illegal rental status change                    │
//! │  └── ValidationError  - Input parsing failures                          │
//! │                                                                         │
//! │  fleetrent-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  fleetrent-rental errors (separate crate)                               │
//! │  ├── CreateRentalError                                                  │
//! │  └── CancelRentalError                                                  │
//! │                                                                         │
//! │  Flow: IndicatorError/PricingError → CreateRentalError → CLI            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Categories
//! - *Input errors*: `InvalidDate`, `InvalidDateRange`. Caller's fault.
//! - *External-source errors*: `ConnectionFailure`, `Timeout`, `ServerError`,
//!   `MalformedPayload`, `NotFoundInWindow`. Never silently defaulted.

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::RentalStatus;

// =============================================================================
// Indicator Error
// =============================================================================

/// Failures while resolving an indicator quote for a date.
///
/// None of these are retried automatically. The only "retry" the resolver
/// performs is the backward date scan, and that only happens on a
/// well-formed response with no data point.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndicatorError {
    /// The requested date could not be parsed. Rejected before any lookup.
    #[error("Invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    /// Transport failure (connection refused, DNS, TLS, reset).
    #[error("Indicator source unreachable: {0}")]
    ConnectionFailure(String),

    /// A single lookup attempt exceeded its bounded wait.
    #[error("Indicator source timed out after {after:?}")]
    Timeout { after: Duration },

    /// The source answered with a non-2xx status.
    #[error("Indicator source returned HTTP {status}")]
    ServerError { status: u16 },

    /// Valid transport, but the body was not the expected structure.
    #[error("Malformed indicator payload: {0}")]
    MalformedPayload(String),

    /// Every candidate date in the lookback window came back empty.
    #[error("No indicator value published within {lookback_days} days up to {target}")]
    NotFoundInWindow {
        target: NaiveDate,
        lookback_days: u32,
    },
}

impl IndicatorError {
    /// Returns true when the error means the source itself is unavailable,
    /// as opposed to the request or the data being at fault.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            IndicatorError::ConnectionFailure(_)
                | IndicatorError::Timeout { .. }
                | IndicatorError::ServerError { .. }
        )
    }
}

// =============================================================================
// Pricing Error
// =============================================================================

/// Failures while pricing a rental.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingError {
    /// End date must be strictly after start date.
    ///
    /// ## When This Occurs
    /// - Same-day rental (zero days)
    /// - Inverted range (end before start)
    #[error("Invalid date range: end {end} must be after start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// The vehicle's daily rate is zero or negative.
    #[error("Daily rate must be positive, got {0}")]
    InvalidDailyRate(Decimal),

    /// The product of days, rate and quote value does not fit a decimal.
    #[error("Rental cost overflowed decimal range")]
    Overflow,
}

// =============================================================================
// Transition Error
// =============================================================================

/// A rental status change outside the state machine.
///
/// ```text
///           cancel
///   Active ────────► Cancelled   (terminal)
///     │
///     └────────────► Finalized   (terminal)
///          finalize
/// ```
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Rental cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: RentalStatus,
    pub to: RentalStatus,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid date, invalid decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for quote resolution.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

// =============================================================================
// Unit Tests
// =============================================================================
