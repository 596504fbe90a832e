//! # Store Traits
//!
//! Persistence seams used by the lifecycle manager.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_vehicle_status(id, expected, new)                                  │
//! │  update_rental_status(id, expected, new)                                │
//! │     └── check-and-set: Ok(false) when the stored status is not          │
//! │         `expected` (or the row is missing). Nothing is written then.    │
//! │                                                                         │
//! │  insert_rental(..)                                                      │
//! │     └── Err(Conflict) when the vehicle already has an active rental     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `SqliteStore` is the production implementation. Tests plug in fakes.

use async_trait::async_trait;
use chrono::NaiveDate;

use fleetrent_core::{
    NewRental, Rental, RentalId, RentalStatus, Vehicle, VehicleId, VehicleStatus,
};
use fleetrent_db::Database;

use crate::error::StoreResult;

// =============================================================================
// Traits
// =============================================================================

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn find_vehicle(&self, id: VehicleId) -> StoreResult<Option<Vehicle>>;

    async fn set_vehicle_status(
        &self,
        id: VehicleId,
        expected: VehicleStatus,
        new: VehicleStatus,
    ) -> StoreResult<bool>;

    async fn list_available_vehicles(&self) -> StoreResult<Vec<Vehicle>>;
}

#[async_trait]
pub trait RentalStore: Send + Sync {
    async fn insert_rental(&self, rental: &NewRental) -> StoreResult<Rental>;

    async fn find_rental(&self, id: RentalId) -> StoreResult<Option<Rental>>;

    async fn update_rental_status(
        &self,
        id: RentalId,
        expected: RentalStatus,
        new: RentalStatus,
    ) -> StoreResult<bool>;

    /// Removes a rental. Only used to undo an insert.
    async fn delete_rental(&self, id: RentalId) -> StoreResult<bool>;

    /// All rentals, newest start date first.
    async fn list_rentals(&self) -> StoreResult<Vec<Rental>>;

    /// Rentals that start or end on `date`.
    async fn list_rentals_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Rental>>;
}

// =============================================================================
// SQLite
// =============================================================================

/// Both stores backed by one SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl VehicleStore for SqliteStore {
    async fn find_vehicle(&self, id: VehicleId) -> StoreResult<Option<Vehicle>> {
        Ok(self.db.vehicles().get_by_id(id).await?)
    }

    async fn set_vehicle_status(
        &self,
        id: VehicleId,
        expected: VehicleStatus,
        new: VehicleStatus,
    ) -> StoreResult<bool> {
        Ok(self
            .db
            .vehicles()
            .compare_and_set_status(id, expected, new)
            .await?)
    }

    async fn list_available_vehicles(&self) -> StoreResult<Vec<Vehicle>> {
        Ok(self.db.vehicles().list_available().await?)
    }
}

#[async_trait]
impl RentalStore for SqliteStore {
    async fn insert_rental(&self, rental: &NewRental) -> StoreResult<Rental> {
        Ok(self.db.rentals().insert(rental).await?)
    }

    async fn find_rental(&self, id: RentalId) -> StoreResult<Option<Rental>> {
        Ok(self.db.rentals().get_by_id(id).await?)
    }

    async fn update_rental_status(
        &self,
        id: RentalId,
        expected: RentalStatus,
        new: RentalStatus,
    ) -> StoreResult<bool> {
        Ok(self
            .db
            .rentals()
            .compare_and_set_status(id, expected, new)
            .await?)
    }

    async fn delete_rental(&self, id: RentalId) -> StoreResult<bool> {
        Ok(self.db.rentals().delete(id).await?)
    }

    async fn list_rentals(&self) -> StoreResult<Vec<Rental>> {
        Ok(self.db.rentals().list_all().await?)
    }

    async fn list_rentals_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Rental>> {
        Ok(self.db.rentals().list_by_date(date).await?)
    }
}
