//! # Domain Types
//!
//! Core domain types used throughout FleetRent.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Vehicle      │   │     Rental      │   │ IndicatorQuote  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  code           │       │
//! │  │  plate          │   │  vehicle_id     │   │  date           │       │
//! │  │  daily_rate     │   │  total_cost     │   │  value (> 0)    │       │
//! │  │  status         │   │  status         │   └─────────────────┘       │
//! │  └─────────────────┘   │  indicator_*    │                              │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │ VehicleStatus   │   │  RentalStatus   │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  Available      │   │  Active         │                              │
//! │  │  Rented         │   │  Cancelled      │                              │
//! │  │  Maintenance    │   │  Finalized      │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Ids are integers assigned by storage. A `New*` struct carries everything
//! except the id and creation timestamp.
//!
//! ## Units
//! `Vehicle::daily_rate` is expressed in indicator units (e.g. UF), never in
//! the settlement currency. `Rental::total_cost` is settlement currency.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{TransitionError, ValidationError};

/// Storage-assigned vehicle identifier.
pub type VehicleId = i64;

/// Storage-assigned rental identifier.
pub type RentalId = i64;

/// Client identifier (client records live outside this system).
pub type ClientId = i64;

/// Staff identifier (staff records live outside this system).
pub type StaffId = i64;

// =============================================================================
// Indicator Quote
// =============================================================================

/// Published value of an economic indicator on a specific date.
///
/// `date` is the date the value applies to, which may precede the date
/// originally requested when the source skips weekends or holidays.
///
/// Fields are private so a quote with `value <= 0` cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorQuote {
    code: String,
    date: NaiveDate,
    value: Decimal,
}

impl IndicatorQuote {
    /// Creates a quote, rejecting non-positive values.
    pub fn new(
        code: impl Into<String>,
        date: NaiveDate,
        value: Decimal,
    ) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::MustBePositive {
                field: "indicator value".to_string(),
            });
        }
        Ok(Self {
            code: code.into(),
            date,
            value,
        })
    }

    /// Indicator identifier, e.g. `uf`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Date the value applies to.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Worth of one unit in the settlement currency.
    pub fn value(&self) -> Decimal {
        self.value
    }
}

// =============================================================================
// Vehicle Status
// =============================================================================

/// Availability of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    /// Can be booked.
    Available,
    /// Held by exactly one Active rental.
    Rented,
    /// Out of service. Cannot be booked.
    Maintenance,
}

impl VehicleStatus {
    /// Stable lowercase name, matching the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Rented => "rented",
            VehicleStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(VehicleStatus::Available),
            "rented" => Ok(VehicleStatus::Rented),
            "maintenance" => Ok(VehicleStatus::Maintenance),
            _ => Err(ValidationError::NotAllowed {
                field: "vehicle status".to_string(),
                allowed: vec![
                    "available".to_string(),
                    "rented".to_string(),
                    "maintenance".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Rental Status
// =============================================================================

/// Lifecycle state of a rental contract.
///
/// ## State Machine
/// ```text
///   ┌──────────┐  cancel_rental   ┌───────────┐
///   │  Active  │─────────────────►│ Cancelled │
///   └────┬─────┘                  └───────────┘
///        │      finalize_rental   ┌───────────┐
///        └───────────────────────►│ Finalized │
///                                 └───────────┘
/// ```
/// Cancelled and Finalized are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    Active,
    Cancelled,
    Finalized,
}

impl RentalStatus {
    /// Stable lowercase name, matching the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Active => "active",
            RentalStatus::Cancelled => "cancelled",
            RentalStatus::Finalized => "finalized",
        }
    }

    /// No transition leaves a terminal state.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, RentalStatus::Cancelled | RentalStatus::Finalized)
    }

    /// Whether `self -> next` is an edge of the state machine.
    pub const fn can_transition_to(&self, next: RentalStatus) -> bool {
        matches!(
            (self, next),
            (RentalStatus::Active, RentalStatus::Cancelled)
                | (RentalStatus::Active, RentalStatus::Finalized)
        )
    }

    /// Returns `next` if the transition is allowed.
    pub fn transition_to(self, next: RentalStatus) -> Result<RentalStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(RentalStatus::Active),
            "cancelled" => Ok(RentalStatus::Cancelled),
            "finalized" => Ok(RentalStatus::Finalized),
            _ => Err(ValidationError::NotAllowed {
                field: "rental status".to_string(),
                allowed: vec![
                    "active".to_string(),
                    "cancelled".to_string(),
                    "finalized".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Vehicle
// =============================================================================

/// A vehicle in the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// License plate (business identifier, unique).
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    /// Price per day in indicator units.
    pub daily_rate: Decimal,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Whether a new rental may be booked against this vehicle.
    pub fn is_bookable(&self) -> bool {
        self.status == VehicleStatus::Available
    }
}

/// Input for registering a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub daily_rate: Decimal,
    pub status: VehicleStatus,
}

// =============================================================================
// Rental
// =============================================================================

/// A contract binding one vehicle, one client and one staff member over a
/// date range.
///
/// `indicator_value` and `indicator_date` record the quote the cost was
/// computed from. `indicator_date` may precede `start_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    pub id: RentalId,
    pub vehicle_id: VehicleId,
    pub client_id: ClientId,
    pub staff_id: StaffId,
    pub start_date: NaiveDate,
    /// Strictly after `start_date`.
    pub end_date: NaiveDate,
    /// Settlement currency, rounded to minor units.
    pub total_cost: Decimal,
    pub status: RentalStatus,
    pub indicator_value: Decimal,
    pub indicator_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Rental {
    /// Whole days billed.
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// A rental ready to be inserted. Storage assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRental {
    pub vehicle_id: VehicleId,
    pub client_id: ClientId,
    pub staff_id: StaffId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: Decimal,
    pub status: RentalStatus,
    pub indicator_value: Decimal,
    pub indicator_date: NaiveDate,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quote_rejects_non_positive_value() {
        assert!(IndicatorQuote::new("uf", day(2025, 1, 2), Decimal::ZERO).is_err());
        assert!(IndicatorQuote::new("uf", day(2025, 1, 2), dec!(-1)).is_err());

        let quote = IndicatorQuote::new("uf", day(2025, 1, 2), dec!(38416.69)).unwrap();
        assert_eq!(quote.code(), "uf");
        assert_eq!(quote.date(), day(2025, 1, 2));
        assert_eq!(quote.value(), dec!(38416.69));
    }

    #[test]
    fn test_rental_state_machine() {
        use RentalStatus::*;

        assert!(Active.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Finalized));
        assert!(!Active.can_transition_to(Active));

        for terminal in [Cancelled, Finalized] {
            assert!(terminal.is_terminal());
            for next in [Active, Cancelled, Finalized] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Active.is_terminal());
    }

    #[test]
    fn test_transition_to_reports_both_ends() {
        let err = RentalStatus::Finalized
            .transition_to(RentalStatus::Cancelled)
            .unwrap_err();
        assert_eq!(err.from, RentalStatus::Finalized);
        assert_eq!(err.to, RentalStatus::Cancelled);

        assert_eq!(
            RentalStatus::Active.transition_to(RentalStatus::Cancelled),
            Ok(RentalStatus::Cancelled)
        );
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("Active".parse::<RentalStatus>().unwrap(), RentalStatus::Active);
        assert_eq!(RentalStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(
            "maintenance".parse::<VehicleStatus>().unwrap(),
            VehicleStatus::Maintenance
        );
        assert!("parked".parse::<VehicleStatus>().is_err());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&VehicleStatus::Available).unwrap();
        assert_eq!(json, "\"available\"");
        let status: RentalStatus = serde_json::from_str("\"finalized\"").unwrap();
        assert_eq!(status, RentalStatus::Finalized);
    }

    #[test]
    fn test_rental_day_count() {
        let rental = Rental {
            id: 1,
            vehicle_id: 7,
            client_id: 3,
            staff_id: 2,
            start_date: day(2025, 3, 10),
            end_date: day(2025, 3, 13),
            total_cost: dec!(222000),
            status: RentalStatus::Active,
            indicator_value: dec!(37000),
            indicator_date: day(2025, 3, 8),
            created_at: Utc::now(),
        };
        assert_eq!(rental.day_count(), 3);
    }
}
