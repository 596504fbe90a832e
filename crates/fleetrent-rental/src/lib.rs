//! # fleetrent-rental: Rental Lifecycle
//!
//! Orchestrates bookings on top of the pure core, the indicator resolver
//! and the SQLite repositories.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          create_rental                                  │
//! │                                                                         │
//! │   lock(vehicle)                                                         │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   VehicleStore.find_vehicle ── missing ──► VehicleNotFound              │
//! │      │                       ── not available ──► VehicleUnavailable    │
//! │      ▼                                                                  │
//! │   QuoteProvider.resolve(start) ── error ──► Indicator(..)               │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   RentalPricingEngine.price ── error ──► Pricing(..)                    │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   RentalStore.insert_rental (active)                                    │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   VehicleStore.set_vehicle_status(available → rented)                   │
//! │      │             └── fails ──► delete rental ──► Storage              │
//! │      │                              └── delete fails ──► PartialFailure │
//! │      ▼                                                                  │
//! │   Ok(Rental)                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`manager`] - `RentalLifecycleManager`: create / cancel / finalize
//! - [`store`] - `VehicleStore` and `RentalStore` seams, `SqliteStore`
//! - [`locks`] - Per-vehicle async mutexes
//! - [`error`] - Operation error types and `PartialFailure`
//! - [`config`] - `AppConfig` (TOML file + `FLEETRENT_*` overrides)

pub mod config;
pub mod error;
pub mod locks;
pub mod manager;
pub mod store;

pub use config::{AppConfig, ConfigError, LoggingConfig, SettlementConfig};
pub use error::{
    CancelRentalError, CommittedStep, CreateRentalError, FinalizeRentalError, PartialFailure,
    StoreError, StoreResult,
};
pub use locks::VehicleLocks;
pub use manager::{CreateRentalRequest, RentalLifecycleManager};
pub use store::{RentalStore, SqliteStore, VehicleStore};
