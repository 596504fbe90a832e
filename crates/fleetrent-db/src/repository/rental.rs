//! # Rental Repository
//!
//! Database operations for rental records.
//!
//! ## Rental Lifecycle (storage view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. insert()                   status = active                          │
//! │     └── partial UNIQUE index: one active rental per vehicle             │
//! │                                                                         │
//! │  2. compare_and_set_status()   active → cancelled | finalized           │
//! │     └── WHERE id = ? AND status = 'active'                              │
//! │                                                                         │
//! │  3. delete()                   only used to undo a half-done booking    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::parse_decimal;
use fleetrent_core::{NewRental, Rental, RentalId, RentalStatus, VehicleId};

const SELECT_RENTAL: &str = r#"
    SELECT id, vehicle_id, client_id, staff_id, start_date, end_date,
           total_cost, status, indicator_value, indicator_date, created_at
    FROM rentals
"#;

#[derive(Debug, sqlx::FromRow)]
struct RentalRow {
    id: i64,
    vehicle_id: i64,
    client_id: i64,
    staff_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_cost: String,
    status: RentalStatus,
    indicator_value: String,
    indicator_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TryFrom<RentalRow> for Rental {
    type Error = DbError;

    fn try_from(row: RentalRow) -> DbResult<Self> {
        Ok(Rental {
            id: row.id,
            vehicle_id: row.vehicle_id,
            client_id: row.client_id,
            staff_id: row.staff_id,
            start_date: row.start_date,
            end_date: row.end_date,
            total_cost: parse_decimal("rentals.total_cost", &row.total_cost)?,
            status: row.status,
            indicator_value: parse_decimal("rentals.indicator_value", &row.indicator_value)?,
            indicator_date: row.indicator_date,
            created_at: row.created_at,
        })
    }
}

/// Repository for rental database operations.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    pool: SqlitePool,
}

impl RentalRepository {
    /// Creates a new RentalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RentalRepository { pool }
    }

    /// Inserts a rental and returns it with its assigned id.
    ///
    /// ## Errors
    /// `UniqueViolation` when the vehicle already has an active rental.
    pub async fn insert(&self, rental: &NewRental) -> DbResult<Rental> {
        debug!(
            vehicle_id = rental.vehicle_id,
            start = %rental.start_date,
            end = %rental.end_date,
            "Inserting rental"
        );

        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO rentals (
                vehicle_id, client_id, staff_id, start_date, end_date,
                total_cost, status, indicator_value, indicator_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(rental.vehicle_id)
        .bind(rental.client_id)
        .bind(rental.staff_id)
        .bind(rental.start_date)
        .bind(rental.end_date)
        .bind(rental.total_cost.to_string())
        .bind(rental.status)
        .bind(rental.indicator_value.to_string())
        .bind(rental.indicator_date)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: rental.vehicle_id.to_string(),
            },
            other => other,
        })?;

        Ok(Rental {
            id: result.last_insert_rowid(),
            vehicle_id: rental.vehicle_id,
            client_id: rental.client_id,
            staff_id: rental.staff_id,
            start_date: rental.start_date,
            end_date: rental.end_date,
            total_cost: rental.total_cost,
            status: rental.status,
            indicator_value: rental.indicator_value,
            indicator_date: rental.indicator_date,
            created_at,
        })
    }

    /// Gets a rental by id.
    pub async fn get_by_id(&self, id: RentalId) -> DbResult<Option<Rental>> {
        let row: Option<RentalRow> = sqlx::query_as(&format!("{SELECT_RENTAL} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Rental::try_from).transpose()
    }

    /// Lists every rental, latest start date first.
    pub async fn list_all(&self) -> DbResult<Vec<Rental>> {
        let rows: Vec<RentalRow> =
            sqlx::query_as(&format!("{SELECT_RENTAL} ORDER BY start_date DESC, id DESC"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Rental::try_from).collect()
    }

    /// Lists rentals that start or end on `date`.
    pub async fn list_by_date(&self, date: NaiveDate) -> DbResult<Vec<Rental>> {
        let rows: Vec<RentalRow> = sqlx::query_as(&format!(
            "{SELECT_RENTAL} WHERE start_date = ?1 OR end_date = ?1 ORDER BY id"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Rental::try_from).collect()
    }

    /// Sets `status = new` only if the current status is `expected`.
    ///
    /// Returns `false` when the rental is missing or was not in `expected`.
    pub async fn compare_and_set_status(
        &self,
        id: RentalId,
        expected: RentalStatus,
        new: RentalStatus,
    ) -> DbResult<bool> {
        debug!(id, %expected, %new, "Updating rental status");

        let result = sqlx::query("UPDATE rentals SET status = ?1 WHERE id = ?2 AND status = ?3")
            .bind(new)
            .bind(id)
            .bind(expected)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes a rental. Returns `false` if it did not exist.
    pub async fn delete(&self, id: RentalId) -> DbResult<bool> {
        debug!(id, "Deleting rental");

        let result = sqlx::query("DELETE FROM rentals WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use fleetrent_core::{NewVehicle, VehicleStatus};
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> (Database, VehicleId) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let vehicle = db
            .vehicles()
            .insert(&NewVehicle {
                plate: "KXTR45".to_string(),
                brand: "Kia".to_string(),
                model: "Rio".to_string(),
                year: 2021,
                daily_rate: dec!(2),
                status: VehicleStatus::Available,
            })
            .await
            .unwrap();
        (db, vehicle.id)
    }

    fn new_rental(vehicle_id: VehicleId) -> NewRental {
        NewRental {
            vehicle_id,
            client_id: 11,
            staff_id: 3,
            start_date: day(2025, 3, 10),
            end_date: day(2025, 3, 13),
            total_cost: dec!(222000),
            status: RentalStatus::Active,
            indicator_value: dec!(37000.00),
            indicator_date: day(2025, 3, 8),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, vehicle_id) = setup().await;
        let repo = db.rentals();

        let inserted = repo.insert(&new_rental(vehicle_id)).await.unwrap();
        let fetched = repo.get_by_id(inserted.id).await.unwrap().unwrap();

        assert_eq!(fetched.total_cost, dec!(222000));
        assert_eq!(fetched.indicator_value, dec!(37000.00));
        assert_eq!(fetched.indicator_date, day(2025, 3, 8));
        assert_eq!(fetched.status, RentalStatus::Active);
        assert_eq!(fetched.day_count(), 3);
    }

    #[tokio::test]
    async fn test_second_active_rental_for_vehicle_is_rejected() {
        let (db, vehicle_id) = setup().await;
        let repo = db.rentals();

        repo.insert(&new_rental(vehicle_id)).await.unwrap();
        let err = repo.insert(&new_rental(vehicle_id)).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_cancelled_rental_frees_the_active_slot() {
        let (db, vehicle_id) = setup().await;
        let repo = db.rentals();

        let first = repo.insert(&new_rental(vehicle_id)).await.unwrap();
        assert!(repo
            .compare_and_set_status(first.id, RentalStatus::Active, RentalStatus::Cancelled)
            .await
            .unwrap());

        let second = repo.insert(&new_rental(vehicle_id)).await.unwrap();
        assert_ne!(second.id, first.id);
        let stored = repo.get_by_id(second.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RentalStatus::Active);
    }

    #[tokio::test]
    async fn test_compare_and_set_rejects_terminal() {
        let (db, vehicle_id) = setup().await;
        let repo = db.rentals();
        let r = repo.insert(&new_rental(vehicle_id)).await.unwrap();

        assert!(repo
            .compare_and_set_status(r.id, RentalStatus::Active, RentalStatus::Cancelled)
            .await
            .unwrap());
        assert!(!repo
            .compare_and_set_status(r.id, RentalStatus::Active, RentalStatus::Cancelled)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_list_by_date_matches_start_or_end() {
        let (db, vehicle_id) = setup().await;
        let repo = db.rentals();
        repo.insert(&new_rental(vehicle_id)).await.unwrap();

        assert_eq!(repo.list_by_date(day(2025, 3, 10)).await.unwrap().len(), 1);
        assert_eq!(repo.list_by_date(day(2025, 3, 13)).await.unwrap().len(), 1);
        assert!(repo.list_by_date(day(2025, 3, 11)).await.unwrap().is_empty());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, vehicle_id) = setup().await;
        let repo = db.rentals();
        let r = repo.insert(&new_rental(vehicle_id)).await.unwrap();

        assert!(repo.delete(r.id).await.unwrap());
        assert!(!repo.delete(r.id).await.unwrap());
        assert!(repo.get_by_id(r.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_vehicle_is_foreign_key_violation() {
        let (db, _) = setup().await;
        let err = db.rentals().insert(&new_rental(777)).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
