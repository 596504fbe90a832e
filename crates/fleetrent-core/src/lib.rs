//! # fleetrent-core: Pure Business Logic for FleetRent
//!
//! Pricing, money, rental status machine and the cancellation rule, all as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        FleetRent Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/fleetrent (command line)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        fleetrent-rental (RentalLifecycleManager)                │   │
//! │  └──────┬──────────────────────┬────────────────────────┬──────────┘   │
//! │         │                      │                        │              │
//! │  ┌──────▼────────┐   ┌─────────▼─────────────┐   ┌──────▼──────────┐   │
//! │  │ fleetrent-db  │   │ ★ fleetrent-core ★    │   │ fleetrent-      │   │
//! │  │ SQLite repos  │   │                       │   │ indicator       │   │
//! │  └───────────────┘   │  types    pricing     │   │ HTTP resolver   │   │
//! │                      │  money    policy      │   └─────────────────┘   │
//! │                      │  error    validation  │                         │
//! │                      │                       │                         │
//! │                      │  NO I/O • PURE FNS    │                         │
//! │                      └───────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Vehicle, Rental, IndicatorQuote, statuses)
//! - [`money`] - Settlement-currency `Money` on exact decimals
//! - [`pricing`] - `RentalPricingEngine`
//! - [`policy`] - Cancellation window rule
//! - [`validation`] - Input parsing and checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use fleetrent_core::{IndicatorQuote, RentalPricingEngine};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 3, 13).unwrap();
//! let quote = IndicatorQuote::new("uf", start, Decimal::from(37_000)).unwrap();
//!
//! let engine = RentalPricingEngine::new(0);
//! let result = engine.price(start, end, Decimal::from(2), &quote).unwrap();
//!
//! assert_eq!(result.day_count, 3);
//! assert_eq!(result.total_cost.amount(), Decimal::from(222_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod policy;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{IndicatorError, IndicatorResult, PricingError, TransitionError, ValidationError};
pub use money::Money;
pub use pricing::{PricingResult, RentalPricingEngine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of calendar days the resolver may step back from the requested
/// date, including the requested date itself.
pub const MAX_LOOKBACK_DAYS: u32 = 7;

/// Minimum lead time before a rental's start at which it can still be
/// cancelled. Fixed business rule.
pub const CANCELLATION_WINDOW_HOURS: i64 = 4;
