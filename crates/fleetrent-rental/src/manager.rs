//! # Rental Lifecycle Manager
//!
//! Creates, cancels and finalizes rentals while keeping the rental and the
//! vehicle record in agreement.
//!
//! ## State Machine
//! ```text
//!                  cancel_rental (≥ 4h before start)
//!            ┌──────────────────────────────────────► Cancelled
//!   Active ──┤
//!            └──────────────────────────────────────► Finalized
//!                  finalize_rental
//! ```
//!
//! ## Two-Step Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create:  insert rental (active)  ──►  vehicle available → rented       │
//! │              undo: delete rental                                        │
//! │                                                                         │
//! │  close:   rental active → closed  ──►  vehicle rented → available       │
//! │              undo: rental closed → active                               │
//! │                                                                         │
//! │  second step fails, undo succeeds  ──►  Storage / VehicleUnavailable    │
//! │  second step fails, undo fails     ──►  PartialFailure                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation on a vehicle runs under that vehicle's lock, so two
//! bookings for the same car in this process are serialized. The store's
//! check-and-set updates cover other processes.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use fleetrent_core::policy;
use fleetrent_core::{
    ClientId, IndicatorQuote, IndicatorResult, NewRental, Rental, RentalId,
    RentalPricingEngine, RentalStatus, StaffId, Vehicle, VehicleId, VehicleStatus,
};
use fleetrent_indicator::QuoteProvider;

use crate::error::{
    CancelRentalError, CommittedStep, CreateRentalError, FinalizeRentalError, PartialFailure,
    StoreError, StoreResult,
};
use crate::locks::VehicleLocks;
use crate::store::{RentalStore, VehicleStore};

// =============================================================================
// Request
// =============================================================================

/// Input for [`RentalLifecycleManager::create_rental`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateRentalRequest {
    pub vehicle_id: VehicleId,
    pub client_id: ClientId,
    pub staff_id: StaffId,
    pub start_date: NaiveDate,
    /// Exclusive. Must be after `start_date`.
    pub end_date: NaiveDate,
}

// =============================================================================
// Close outcome (shared by cancel and finalize)
// =============================================================================

enum CloseFailure {
    NotFound,
    InvalidState(RentalStatus),
    Storage(StoreError),
    Partial(PartialFailure),
}

impl CloseFailure {
    fn into_cancel(self, rental_id: RentalId) -> CancelRentalError {
        match self {
            CloseFailure::NotFound => CancelRentalError::RentalNotFound(rental_id),
            CloseFailure::InvalidState(current) => {
                CancelRentalError::InvalidStateTransition { rental_id, current }
            }
            CloseFailure::Storage(e) => CancelRentalError::Storage(e),
            CloseFailure::Partial(p) => CancelRentalError::PartialFailure(p),
        }
    }

    fn into_finalize(self, rental_id: RentalId) -> FinalizeRentalError {
        match self {
            CloseFailure::NotFound => FinalizeRentalError::RentalNotFound(rental_id),
            CloseFailure::InvalidState(current) => {
                FinalizeRentalError::InvalidStateTransition { rental_id, current }
            }
            CloseFailure::Storage(e) => FinalizeRentalError::Storage(e),
            CloseFailure::Partial(p) => FinalizeRentalError::PartialFailure(p),
        }
    }
}

// =============================================================================
// Manager
// =============================================================================

pub struct RentalLifecycleManager<S, Q> {
    store: S,
    quotes: Q,
    pricing: RentalPricingEngine,
    locks: VehicleLocks,
}

impl<S, Q> RentalLifecycleManager<S, Q>
where
    S: VehicleStore + RentalStore,
    Q: QuoteProvider,
{
    pub fn new(store: S, quotes: Q, pricing: RentalPricingEngine) -> Self {
        RentalLifecycleManager {
            store,
            quotes,
            pricing,
            locks: VehicleLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    /// Books a vehicle.
    ///
    /// ## Steps
    /// 1. Vehicle must exist and be available
    /// 2. Resolve the indicator for the start date (may step back)
    /// 3. Price `days × daily_rate × quote`
    /// 4. Insert the rental as active
    /// 5. Mark the vehicle rented (check-and-set from available)
    ///
    /// Nothing is written before step 4. If step 5 fails the rental is
    /// deleted again.
    #[instrument(skip(self), fields(vehicle_id = request.vehicle_id))]
    pub async fn create_rental(
        &self,
        request: CreateRentalRequest,
    ) -> Result<Rental, CreateRentalError> {
        let _guard = self.locks.acquire(request.vehicle_id).await;

        let vehicle = self.bookable_vehicle(request.vehicle_id).await?;

        let quote = self.quotes.resolve(request.start_date).await?;
        if quote.date() != request.start_date {
            debug!(
                requested = %request.start_date,
                quoted = %quote.date(),
                "Using earlier published indicator value"
            );
        }

        let priced = self.pricing.price(
            request.start_date,
            request.end_date,
            vehicle.daily_rate,
            &quote,
        )?;

        let new_rental = NewRental {
            vehicle_id: vehicle.id,
            client_id: request.client_id,
            staff_id: request.staff_id,
            start_date: request.start_date,
            end_date: request.end_date,
            total_cost: priced.total_cost.amount(),
            status: RentalStatus::Active,
            indicator_value: priced.quote_value,
            indicator_date: priced.quote_date,
        };

        let rental = match self.store.insert_rental(&new_rental).await {
            Ok(rental) => rental,
            Err(StoreError::Conflict(reason)) => {
                warn!(%reason, "Vehicle already has an active rental");
                return Err(self.held_by_active_rental(vehicle.id).await);
            }
            Err(e) => return Err(e.into()),
        };

        match self
            .store
            .set_vehicle_status(vehicle.id, VehicleStatus::Available, VehicleStatus::Rented)
            .await
        {
            Ok(true) => {
                info!(
                    rental_id = rental.id,
                    total_cost = %rental.total_cost,
                    days = priced.day_count,
                    "Rental created"
                );
                Ok(rental)
            }
            Ok(false) => {
                warn!(rental_id = rental.id, "Vehicle changed state during booking, undoing");
                self.undo_insert(&rental, "vehicle was no longer available")
                    .await?;
                Err(self.unavailable_now(vehicle.id).await)
            }
            Err(e) => {
                error!(rental_id = rental.id, error = %e, "Failed to reserve vehicle, undoing");
                self.undo_insert(&rental, &e.to_string()).await?;
                Err(CreateRentalError::Storage(e))
            }
        }
    }

    async fn bookable_vehicle(&self, vehicle_id: VehicleId) -> Result<Vehicle, CreateRentalError> {
        let vehicle = self
            .store
            .find_vehicle(vehicle_id)
            .await?
            .ok_or(CreateRentalError::VehicleNotFound(vehicle_id))?;

        if !vehicle.is_bookable() {
            return Err(CreateRentalError::VehicleUnavailable {
                vehicle_id,
                status: vehicle.status,
            });
        }
        Ok(vehicle)
    }

    /// Deletes a just-inserted rental. Escalates to `PartialFailure` when
    /// the delete does not go through.
    async fn undo_insert(&self, rental: &Rental, cause: &str) -> Result<(), CreateRentalError> {
        let rollback_error = match self.store.delete_rental(rental.id).await {
            Ok(true) => return Ok(()),
            Ok(false) => "rental row vanished before rollback".to_string(),
            Err(e) => e.to_string(),
        };

        error!(
            rental_id = rental.id,
            vehicle_id = rental.vehicle_id,
            %rollback_error,
            "Rollback failed, active rental without a rented vehicle"
        );
        Err(CreateRentalError::PartialFailure(PartialFailure {
            rental_id: rental.id,
            vehicle_id: rental.vehicle_id,
            committed: CommittedStep::RentalInserted,
            cause: cause.to_string(),
            rollback_error,
        }))
    }

    async fn unavailable_now(&self, vehicle_id: VehicleId) -> CreateRentalError {
        match self.store.find_vehicle(vehicle_id).await {
            Ok(Some(vehicle)) => CreateRentalError::VehicleUnavailable {
                vehicle_id,
                status: vehicle.status,
            },
            Ok(None) => CreateRentalError::VehicleNotFound(vehicle_id),
            Err(e) => CreateRentalError::Storage(e),
        }
    }

    /// Error for an insert rejected because another rental is active. An
    /// available status at this point is stale, so it is reported as rented.
    async fn held_by_active_rental(&self, vehicle_id: VehicleId) -> CreateRentalError {
        match self.unavailable_now(vehicle_id).await {
            CreateRentalError::VehicleUnavailable {
                status: VehicleStatus::Available,
                ..
            } => CreateRentalError::VehicleUnavailable {
                vehicle_id,
                status: VehicleStatus::Rented,
            },
            other => other,
        }
    }

    // -------------------------------------------------------------------------
    // Cancel / Finalize
    // -------------------------------------------------------------------------

    /// Cancels an active rental and releases its vehicle.
    ///
    /// `now` is the caller's local business time. Cancelling requires at
    /// least four hours before the start date's midnight.
    #[instrument(skip(self))]
    pub async fn cancel_rental(
        &self,
        rental_id: RentalId,
        now: NaiveDateTime,
    ) -> Result<(), CancelRentalError> {
        let rental = self
            .store
            .find_rental(rental_id)
            .await?
            .ok_or(CancelRentalError::RentalNotFound(rental_id))?;

        let _guard = self.locks.acquire(rental.vehicle_id).await;

        if rental.status.transition_to(RentalStatus::Cancelled).is_err() {
            return Err(CancelRentalError::InvalidStateTransition {
                rental_id,
                current: rental.status,
            });
        }

        if !policy::can_cancel(rental.start_date, now) {
            return Err(CancelRentalError::CancellationWindowExpired {
                rental_id,
                starts_at: policy::rental_starts_at(rental.start_date),
                now,
            });
        }

        self.close(&rental, RentalStatus::Cancelled)
            .await
            .map_err(|f| f.into_cancel(rental_id))?;

        info!(rental_id, vehicle_id = rental.vehicle_id, "Rental cancelled");
        Ok(())
    }

    /// Marks an active rental as finished and releases its vehicle.
    #[instrument(skip(self))]
    pub async fn finalize_rental(&self, rental_id: RentalId) -> Result<(), FinalizeRentalError> {
        let rental = self
            .store
            .find_rental(rental_id)
            .await?
            .ok_or(FinalizeRentalError::RentalNotFound(rental_id))?;

        let _guard = self.locks.acquire(rental.vehicle_id).await;

        if rental.status.transition_to(RentalStatus::Finalized).is_err() {
            return Err(FinalizeRentalError::InvalidStateTransition {
                rental_id,
                current: rental.status,
            });
        }

        self.close(&rental, RentalStatus::Finalized)
            .await
            .map_err(|f| f.into_finalize(rental_id))?;

        info!(rental_id, vehicle_id = rental.vehicle_id, "Rental finalized");
        Ok(())
    }

    /// Moves an active rental to `closed` and the vehicle back to available.
    async fn close(&self, rental: &Rental, closed: RentalStatus) -> Result<(), CloseFailure> {
        let moved = self
            .store
            .update_rental_status(rental.id, RentalStatus::Active, closed)
            .await
            .map_err(CloseFailure::Storage)?;

        if !moved {
            // Someone else closed it between our read and the update
            return Err(match self.store.find_rental(rental.id).await {
                Ok(Some(r)) => CloseFailure::InvalidState(r.status),
                Ok(None) => CloseFailure::NotFound,
                Err(e) => CloseFailure::Storage(e),
            });
        }

        match self
            .store
            .set_vehicle_status(rental.vehicle_id, VehicleStatus::Rented, VehicleStatus::Available)
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(
                    rental_id = rental.id,
                    vehicle_id = rental.vehicle_id,
                    "Vehicle was not marked rented, leaving its status unchanged"
                );
                Ok(())
            }
            Err(cause) => {
                error!(rental_id = rental.id, error = %cause, "Failed to release vehicle, undoing");
                self.reopen(rental, closed, cause).await
            }
        }
    }

    async fn reopen(
        &self,
        rental: &Rental,
        closed: RentalStatus,
        cause: StoreError,
    ) -> Result<(), CloseFailure> {
        let rollback_error = match self
            .store
            .update_rental_status(rental.id, closed, RentalStatus::Active)
            .await
        {
            Ok(true) => return Err(CloseFailure::Storage(cause)),
            Ok(false) => format!("rental no longer {closed}"),
            Err(e) => e.to_string(),
        };

        error!(
            rental_id = rental.id,
            vehicle_id = rental.vehicle_id,
            %rollback_error,
            "Rollback failed, closed rental still holds a rented vehicle"
        );
        Err(CloseFailure::Partial(PartialFailure {
            rental_id: rental.id,
            vehicle_id: rental.vehicle_id,
            committed: CommittedStep::RentalStatusChanged(closed),
            cause: cause.to_string(),
            rollback_error,
        }))
    }

    // -------------------------------------------------------------------------
    // Read-only accessors
    // -------------------------------------------------------------------------

    pub async fn get_rental(&self, rental_id: RentalId) -> StoreResult<Option<Rental>> {
        self.store.find_rental(rental_id).await
    }

    pub async fn list_rentals(&self) -> StoreResult<Vec<Rental>> {
        self.store.list_rentals().await
    }

    pub async fn list_rentals_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Rental>> {
        self.store.list_rentals_by_date(date).await
    }

    pub async fn list_available_vehicles(&self) -> StoreResult<Vec<Vehicle>> {
        self.store.list_available_vehicles().await
    }

    /// Indicator value that a booking starting on `date` would use.
    pub async fn quote_for(&self, date: NaiveDate) -> IndicatorResult<IndicatorQuote> {
        self.quotes.resolve(date).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
