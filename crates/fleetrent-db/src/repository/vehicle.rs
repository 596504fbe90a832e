//! # Vehicle Repository
//!
//! Vehicle registry and availability.
//!
//! ## Availability Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE vehicles SET status = 'rented'                                  │
//! │   WHERE id = ?  AND status = 'available'                                │
//! │                                                                         │
//! │  rows_affected = 1  → this caller won the vehicle                       │
//! │  rows_affected = 0  → someone else changed it first (or no such id)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Two bookings racing for one vehicle cannot both observe `available` and
//! both succeed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::parse_decimal;
use fleetrent_core::{NewVehicle, Vehicle, VehicleId, VehicleStatus};

const SELECT_VEHICLE: &str = r#"
    SELECT id, plate, brand, model, year, daily_rate_units, status, created_at
    FROM vehicles
"#;

#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: i64,
    plate: String,
    brand: String,
    model: String,
    year: i32,
    daily_rate_units: String,
    status: VehicleStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = DbError;

    fn try_from(row: VehicleRow) -> DbResult<Self> {
        Ok(Vehicle {
            id: row.id,
            plate: row.plate,
            brand: row.brand,
            model: row.model,
            year: row.year,
            daily_rate: parse_decimal("vehicles.daily_rate_units", &row.daily_rate_units)?,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

/// Repository for vehicle database operations.
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: SqlitePool,
}

impl VehicleRepository {
    /// Creates a new VehicleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VehicleRepository { pool }
    }

    /// Registers a vehicle and returns it with its assigned id.
    pub async fn insert(&self, vehicle: &NewVehicle) -> DbResult<Vehicle> {
        debug!(plate = %vehicle.plate, "Inserting vehicle");

        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO vehicles (plate, brand, model, year, daily_rate_units, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&vehicle.plate)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.daily_rate.to_string())
        .bind(vehicle.status)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: vehicle.plate.clone(),
            },
            other => other,
        })?;

        Ok(Vehicle {
            id: result.last_insert_rowid(),
            plate: vehicle.plate.clone(),
            brand: vehicle.brand.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            daily_rate: vehicle.daily_rate,
            status: vehicle.status,
            created_at,
        })
    }

    /// Gets a vehicle by id.
    pub async fn get_by_id(&self, id: VehicleId) -> DbResult<Option<Vehicle>> {
        let row: Option<VehicleRow> =
            sqlx::query_as(&format!("{SELECT_VEHICLE} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Vehicle::try_from).transpose()
    }

    /// Lists every vehicle, ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Vehicle>> {
        let rows: Vec<VehicleRow> = sqlx::query_as(&format!("{SELECT_VEHICLE} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Vehicle::try_from).collect()
    }

    /// Lists vehicles that can be booked right now.
    pub async fn list_available(&self) -> DbResult<Vec<Vehicle>> {
        let rows: Vec<VehicleRow> =
            sqlx::query_as(&format!("{SELECT_VEHICLE} WHERE status = ?1 ORDER BY id"))
                .bind(VehicleStatus::Available)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Vehicle::try_from).collect()
    }

    /// Sets `status = new` only if the current status is `expected`.
    ///
    /// ## Returns
    /// * `Ok(true)` - exactly one row changed
    /// * `Ok(false)` - the vehicle is missing or its status was not `expected`
    pub async fn compare_and_set_status(
        &self,
        id: VehicleId,
        expected: VehicleStatus,
        new: VehicleStatus,
    ) -> DbResult<bool> {
        debug!(id, %expected, %new, "Updating vehicle status");

        let result = sqlx::query("UPDATE vehicles SET status = ?1 WHERE id = ?2 AND status = ?3")
            .bind(new)
            .bind(id)
            .bind(expected)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Total number of vehicles.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
