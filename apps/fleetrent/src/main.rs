//! # FleetRent CLI
//!
//! Front-desk commands for the rental lifecycle.
//!
//! ```text
//! fleetrent quote 2025-01-06                  # indicator value used for that start date
//! fleetrent vehicle add ABCD12 Kia Rio 2023 1.2
//! fleetrent vehicle list [--available]
//! fleetrent rent --vehicle 1 --client 10 --staff 2 --from 2025-01-06 --to 2025-01-09
//! fleetrent cancel 7
//! fleetrent finalize 7
//! fleetrent show 7
//! fleetrent list [--date 2025-01-06]
//! ```
//!
//! ## Log Levels
//! - `RUST_LOG=debug` wins over everything
//! - otherwise `[logging] level` / `FLEETRENT_LOG_LEVEL`
//! - `--verbose` forces debug for the fleetrent crates

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fleetrent_core::validation::parse_date;
use fleetrent_rental::AppConfig;

#[derive(Parser, Debug)]
#[command(
    name = "fleetrent",
    author = "FleetRent Team",
    version,
    about = "Vehicle rental desk: quotes, bookings and cancellations"
)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = "FLEETRENT_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging for fleetrent crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the indicator value a booking starting on DATE would use
    Quote {
        #[arg(value_parser = date_arg)]
        date: NaiveDate,
    },

    /// Manage the fleet
    Vehicle {
        #[command(subcommand)]
        action: VehicleAction,
    },

    /// Book a vehicle
    Rent {
        #[arg(long)]
        vehicle: i64,
        #[arg(long)]
        client: i64,
        #[arg(long)]
        staff: i64,
        /// First day of the rental (YYYY-MM-DD or DD-MM-YYYY)
        #[arg(long, value_parser = date_arg)]
        from: NaiveDate,
        /// Return day, exclusive
        #[arg(long, value_parser = date_arg)]
        to: NaiveDate,
    },

    /// Cancel an active rental (at least 4 hours before it starts)
    Cancel { rental_id: i64 },

    /// Close an active rental and release its vehicle
    Finalize { rental_id: i64 },

    /// Show one rental
    Show { rental_id: i64 },

    /// List rentals, optionally only those starting or ending on a date
    List {
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },

    /// Check the database connection and schema version
    Status,
}

#[derive(Subcommand, Debug)]
enum VehicleAction {
    /// Register a vehicle
    Add {
        plate: String,
        brand: String,
        model: String,
        year: i32,
        /// Daily rate in indicator units (e.g. 1.2 UF)
        rate: String,
        /// Register it as under maintenance
        #[arg(long)]
        maintenance: bool,
    },

    /// List vehicles
    List {
        /// Only vehicles that can be booked now
        #[arg(long)]
        available: bool,
    },
}

fn date_arg(input: &str) -> Result<NaiveDate, String> {
    parse_date("date", input).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.clone()).context("Failed to load configuration")?;
    init_tracing(&config, args.verbose);
    debug!(?config, "Configuration loaded");

    commands::run(args.command, &config).await
}

fn init_tracing(config: &AppConfig, verbose: bool) {
    let fallback = if verbose {
        "info,fleetrent=debug,fleetrent_rental=debug,fleetrent_indicator=debug,sqlx=warn"
            .to_string()
    } else {
        format!("{},sqlx=warn", config.logging.level)
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
