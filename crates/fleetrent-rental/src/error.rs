//! # Rental Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Rental Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────────┐  ┌──────────────────┐  ┌────────────────────┐  │
//! │  │  Input              │  │  External source │  │  Consistency       │  │
//! │  │                     │  │                  │  │                    │  │
//! │  │  VehicleNotFound    │  │  Indicator(..)   │  │  PartialFailure    │  │
//! │  │  VehicleUnavailable │  │                  │  │                    │  │
//! │  │  RentalNotFound     │  │                  │  │                    │  │
//! │  │  InvalidState..     │  │                  │  │                    │  │
//! │  │  CancellationWin..  │  │                  │  │                    │  │
//! │  │  Pricing(..)        │  │                  │  │                    │  │
//! │  └─────────────────────┘  └──────────────────┘  └────────────────────┘  │
//! │                                                                         │
//! │  Storage(..) - a store call failed and nothing was committed            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `PartialFailure` is the only variant meaning "something was written and
//! could not be undone". Every other error means nothing changed.

use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

use fleetrent_core::{
    IndicatorError, PricingError, RentalId, RentalStatus, VehicleId, VehicleStatus,
};
use fleetrent_db::DbError;

// =============================================================================
// Store Error
// =============================================================================

/// Failure reported by a persistence collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness rule rejected the write (e.g. second active rental).
    #[error("Storage conflict: {0}")]
    Conflict(String),

    /// The backend failed.
    #[error("Storage failure: {0}")]
    Backend(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { .. } => StoreError::Conflict(err.to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Result type for store calls.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Partial Failure
// =============================================================================

/// The first write of a two-step operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommittedStep {
    RentalInserted,
    RentalStatusChanged(RentalStatus),
}

impl fmt::Display for CommittedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommittedStep::RentalInserted => f.write_str("rental inserted as active"),
            CommittedStep::RentalStatusChanged(status) => {
                write!(f, "rental marked {}", status)
            }
        }
    }
}

/// A two-step write where the second step failed and undoing the first also
/// failed. The stores may now disagree and need manual repair.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "Partial failure on rental {rental_id} / vehicle {vehicle_id}: {committed}, \
     then vehicle update failed ({cause}) and rollback failed ({rollback_error})"
)]
pub struct PartialFailure {
    pub rental_id: RentalId,
    pub vehicle_id: VehicleId,
    pub committed: CommittedStep,
    pub cause: String,
    pub rollback_error: String,
}

// =============================================================================
// Create Rental Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CreateRentalError {
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// The vehicle is Rented or in Maintenance.
    #[error("Vehicle {vehicle_id} is not available (status: {status})")]
    VehicleUnavailable {
        vehicle_id: VehicleId,
        status: VehicleStatus,
    },

    /// The indicator could not be resolved. Surfaced unchanged.
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    PartialFailure(PartialFailure),
}

impl CreateRentalError {
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, CreateRentalError::PartialFailure(_))
    }

    /// Caller's fault; retrying the same request cannot succeed.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CreateRentalError::VehicleNotFound(_)
                | CreateRentalError::VehicleUnavailable { .. }
                | CreateRentalError::Pricing(_)
                | CreateRentalError::Indicator(IndicatorError::InvalidDate { .. })
        )
    }
}

// =============================================================================
// Cancel Rental Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CancelRentalError {
    #[error("Rental not found: {0}")]
    RentalNotFound(RentalId),

    /// The rental is already Cancelled or Finalized.
    #[error("Rental {rental_id} is {current}, only active rentals can be cancelled")]
    InvalidStateTransition {
        rental_id: RentalId,
        current: RentalStatus,
    },

    #[error(
        "Rental {rental_id} starts at {starts_at}; cancellation closes 4 hours before (now {now})"
    )]
    CancellationWindowExpired {
        rental_id: RentalId,
        starts_at: NaiveDateTime,
        now: NaiveDateTime,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    PartialFailure(PartialFailure),
}

impl CancelRentalError {
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, CancelRentalError::PartialFailure(_))
    }
}

// =============================================================================
// Finalize Rental Error
// =============================================================================

#[derive(Debug, Error)]
pub enum FinalizeRentalError {
    #[error("Rental not found: {0}")]
    RentalNotFound(RentalId),

    #[error("Rental {rental_id} is {current}, only active rentals can be finalized")]
    InvalidStateTransition {
        rental_id: RentalId,
        current: RentalStatus,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    PartialFailure(PartialFailure),
}

impl FinalizeRentalError {
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, FinalizeRentalError::PartialFailure(_))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
