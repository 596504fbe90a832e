//! # Repository Module
//!
//! Database repository implementations for FleetRent.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SqliteStore (fleetrent-rental)                                         │
//! │       │                                                                 │
//! │       │  db.vehicles().compare_and_set_status(7, Available, Rented)     │
//! │       ▼                                                                 │
//! │  VehicleRepository / RentalRepository                                   │
//! │  ├── insert / get_by_id / list_*                                        │
//! │  └── compare_and_set_status  ← single-row check-and-set                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Row Mapping
//! Queries decode into private `*Row` structs, then convert into the core
//! domain types. Decimal columns are TEXT and are parsed during conversion,
//! so a corrupt value surfaces as [`DbError::InvalidData`](crate::DbError)
//! instead of a silently wrong amount.
//!
//! ## Available Repositories
//!
//! - [`VehicleRepository`](vehicle::VehicleRepository) - Vehicle registry and availability
//! - [`RentalRepository`](rental::RentalRepository) - Rental records and status

pub mod rental;
pub mod vehicle;

use rust_decimal::Decimal;

use crate::error::{DbError, DbResult};

/// Parses a TEXT decimal column.
pub(crate) fn parse_decimal(column: &str, raw: &str) -> DbResult<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|e| DbError::invalid_data(column, e))
}
