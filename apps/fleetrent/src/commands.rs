//! Command handlers and text rendering.

use anyhow::{bail, Context};
use chrono::Local;
use tracing::{error, info};

use fleetrent_core::validation::{normalize_plate, parse_daily_rate};
use fleetrent_core::{NewVehicle, Rental, Vehicle, VehicleStatus};
use fleetrent_db::Database;
use fleetrent_indicator::{HttpIndicatorSource, IndicatorResolver};
use fleetrent_rental::{
    AppConfig, CancelRentalError, CreateRentalError, CreateRentalRequest, FinalizeRentalError,
    RentalLifecycleManager, SqliteStore,
};

use crate::{Command, VehicleAction};

type Manager = RentalLifecycleManager<SqliteStore, IndicatorResolver<HttpIndicatorSource>>;

async fn connect(config: &AppConfig) -> anyhow::Result<Manager> {
    let db_config = config.db_config();
    if let Some(parent) = db_config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let db = Database::new(db_config)
        .await
        .context("Failed to open database")?;
    let resolver = IndicatorResolver::from_config(&config.indicator)
        .context("Failed to build indicator client")?;

    Ok(RentalLifecycleManager::new(
        SqliteStore::new(db),
        resolver,
        config.pricing_engine(),
    ))
}

pub(crate) async fn run(command: Command, config: &AppConfig) -> anyhow::Result<()> {
    let manager = connect(config).await?;
    let currency = config.settlement.currency.as_str();

    let result = dispatch(&manager, command, currency).await;
    manager.store().database().close().await;
    result
}

async fn dispatch(manager: &Manager, command: Command, currency: &str) -> anyhow::Result<()> {
    match command {
        Command::Quote { date } => {
            let quote = manager.quote_for(date).await?;
            if quote.date() == date {
                println!("{} on {}: {}", quote.code().to_uppercase(), date, quote.value());
            } else {
                println!(
                    "{} on {}: {} (published {})",
                    quote.code().to_uppercase(),
                    date,
                    quote.value(),
                    quote.date()
                );
            }
        }

        Command::Vehicle { action } => vehicle(manager, action).await?,

        Command::Rent {
            vehicle,
            client,
            staff,
            from,
            to,
        } => {
            let request = CreateRentalRequest {
                vehicle_id: vehicle,
                client_id: client,
                staff_id: staff,
                start_date: from,
                end_date: to,
            };
            match manager.create_rental(request).await {
                Ok(rental) => {
                    println!("Rental {} created", rental.id);
                    print_rental(&rental, currency);
                }
                Err(e @ CreateRentalError::PartialFailure(_)) => {
                    error!(error = %e, "Booking left inconsistent records");
                    bail!("{e}. Repair the rental and vehicle records manually.");
                }
                Err(e) => bail!(e),
            }
        }

        Command::Cancel { rental_id } => {
            let now = Local::now().naive_local();
            match manager.cancel_rental(rental_id, now).await {
                Ok(()) => println!("Rental {rental_id} cancelled"),
                Err(e @ CancelRentalError::PartialFailure(_)) => {
                    error!(error = %e, "Cancellation left inconsistent records");
                    bail!("{e}. Repair the rental and vehicle records manually.");
                }
                Err(e) => bail!(e),
            }
        }

        Command::Finalize { rental_id } => match manager.finalize_rental(rental_id).await {
            Ok(()) => println!("Rental {rental_id} finalized"),
            Err(e @ FinalizeRentalError::PartialFailure(_)) => {
                error!(error = %e, "Finalization left inconsistent records");
                bail!("{e}. Repair the rental and vehicle records manually.");
            }
            Err(e) => bail!(e),
        },

        Command::Show { rental_id } => match manager.get_rental(rental_id).await? {
            Some(rental) => print_rental(&rental, currency),
            None => bail!("Rental not found: {rental_id}"),
        },

        Command::List { date } => {
            let rentals = match date {
                Some(date) => manager.list_rentals_by_date(date).await?,
                None => manager.list_rentals().await?,
            };
            if rentals.is_empty() {
                println!("No rentals");
            }
            for rental in &rentals {
                print_rental_row(rental, currency);
            }
        }

        Command::Status => {
            let status = manager.store().database().status().await?;
            println!(
                "Database ok, migrations {}/{}",
                status.applied, status.embedded
            );
            if !status.is_current() {
                bail!("Database schema is behind this build");
            }
        }
    }
    Ok(())
}

async fn vehicle(manager: &Manager, action: VehicleAction) -> anyhow::Result<()> {
    let repo = manager.store().database().vehicles();

    match action {
        VehicleAction::Add {
            plate,
            brand,
            model,
            year,
            rate,
            maintenance,
        } => {
            let new_vehicle = NewVehicle {
                plate: normalize_plate(&plate)?,
                brand,
                model,
                year,
                daily_rate: parse_daily_rate(&rate)?,
                status: if maintenance {
                    VehicleStatus::Maintenance
                } else {
                    VehicleStatus::Available
                },
            };
            let vehicle = repo.insert(&new_vehicle).await?;
            info!(id = vehicle.id, plate = %vehicle.plate, "Vehicle registered");
            println!("Vehicle {} registered", vehicle.id);
            print_vehicle_row(&vehicle);
        }

        VehicleAction::List { available } => {
            let vehicles = if available {
                manager.list_available_vehicles().await?
            } else {
                repo.list_all().await?
            };
            if vehicles.is_empty() {
                println!("No vehicles");
            }
            for vehicle in &vehicles {
                print_vehicle_row(vehicle);
            }
        }
    }
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

fn print_rental(rental: &Rental, currency: &str) {
    println!("  id          {}", rental.id);
    println!("  vehicle     {}", rental.vehicle_id);
    println!("  client      {}", rental.client_id);
    println!("  staff       {}", rental.staff_id);
    println!(
        "  period      {} .. {} ({} days)",
        rental.start_date,
        rental.end_date,
        rental.day_count()
    );
    println!(
        "  indicator   {} (published {})",
        rental.indicator_value, rental.indicator_date
    );
    println!(
        "  total       {} {}",
        group_thousands(&rental.total_cost.to_string()),
        currency
    );
    println!("  status      {}", rental.status);
}

fn print_rental_row(rental: &Rental, currency: &str) {
    println!(
        "{:>5}  vehicle {:>4}  {} .. {}  {:>12} {}  {}",
        rental.id,
        rental.vehicle_id,
        rental.start_date,
        rental.end_date,
        group_thousands(&rental.total_cost.to_string()),
        currency,
        rental.status
    );
}

fn print_vehicle_row(vehicle: &Vehicle) {
    println!(
        "{:>4}  {:<8} {} {} {}  {} /day  {}",
        vehicle.id,
        vehicle.plate,
        vehicle.brand,
        vehicle.model,
        vehicle.year,
        vehicle.daily_rate,
        vehicle.status
    );
}

/// `1234567.5` -> `1,234,567.5`
fn group_thousands(amount: &str) -> String {
    let (sign, unsigned) = match amount.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", amount),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("222000"), "222,000");
        assert_eq!(group_thousands("1234567.50"), "1,234,567.50");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("-1000"), "-1,000");
        assert_eq!(group_thousands("0.5"), "0.5");
    }
}
