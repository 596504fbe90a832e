//! End-to-end lifecycle against in-memory SQLite and a mocked indicator API.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetrent_core::{IndicatorError, NewVehicle, RentalPricingEngine, RentalStatus, VehicleStatus};
use fleetrent_db::{Database, DbConfig};
use fleetrent_indicator::{IndicatorConfig, IndicatorResolver};
use fleetrent_rental::{
    CancelRentalError, CreateRentalError, CreateRentalRequest, RentalLifecycleManager, SqliteStore,
};

type Manager =
    RentalLifecycleManager<SqliteStore, IndicatorResolver<fleetrent_indicator::HttpIndicatorSource>>;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Serves 2025-01-03 (a Friday) and "no data" for every other date.
async fn indicator_api() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/uf/03-01-2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "codigo": "uf",
            "serie": [{"fecha": "2025-01-03T03:00:00.000Z", "valor": 38416.69}]
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"codigo": "uf", "serie": []})),
        )
        .with_priority(10)
        .mount(&server)
        .await;

    server
}

async fn setup(server: &MockServer) -> Manager {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    for (plate, status) in [
        ("ABCD12", VehicleStatus::Available),
        ("WXYZ99", VehicleStatus::Maintenance),
    ] {
        db.vehicles()
            .insert(&NewVehicle {
                plate: plate.to_string(),
                brand: "Kia".to_string(),
                model: "Rio".to_string(),
                year: 2023,
                daily_rate: dec!(1.2),
                status,
            })
            .await
            .unwrap();
    }

    let config = IndicatorConfig {
        base_url: server.uri(),
        ..IndicatorConfig::default()
    };
    let resolver = IndicatorResolver::from_config(&config).unwrap();

    RentalLifecycleManager::new(SqliteStore::new(db), resolver, RentalPricingEngine::new(0))
}

#[tokio::test]
async fn weekend_booking_is_priced_with_fridays_value_and_can_be_cancelled() {
    let server = indicator_api().await;
    let manager = setup(&server).await;

    // Sunday start, three days
    let rental = manager
        .create_rental(CreateRentalRequest {
            vehicle_id: 1,
            client_id: 10,
            staff_id: 2,
            start_date: day(2025, 1, 5),
            end_date: day(2025, 1, 8),
        })
        .await
        .unwrap();

    // 3 × 1.2 × 38416.69 = 138300.084
    assert_eq!(rental.total_cost, dec!(138300));
    assert_eq!(rental.indicator_date, day(2025, 1, 3));
    assert_eq!(rental.indicator_value, dec!(38416.69));

    assert_eq!(vehicle_status(&manager, 1).await, VehicleStatus::Rented);
    assert!(manager.list_available_vehicles().await.unwrap().is_empty());

    let now = day(2025, 1, 4).and_time(NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    manager.cancel_rental(rental.id, now).await.unwrap();

    let stored = manager.get_rental(rental.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RentalStatus::Cancelled);
    assert_eq!(vehicle_status(&manager, 1).await, VehicleStatus::Available);

    let err = manager.cancel_rental(rental.id, now).await.unwrap_err();
    assert!(matches!(err, CancelRentalError::InvalidStateTransition { .. }));
}

#[tokio::test]
async fn maintenance_vehicle_is_refused_without_writing() {
    let server = indicator_api().await;
    let manager = setup(&server).await;

    let err = manager
        .create_rental(CreateRentalRequest {
            vehicle_id: 2,
            client_id: 10,
            staff_id: 2,
            start_date: day(2025, 1, 3),
            end_date: day(2025, 1, 4),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CreateRentalError::VehicleUnavailable {
            status: VehicleStatus::Maintenance,
            ..
        }
    ));
    assert!(manager.list_rentals().await.unwrap().is_empty());
}

#[tokio::test]
async fn no_value_in_window_blocks_the_booking() {
    let server = indicator_api().await;
    let manager = setup(&server).await;

    // 7 dates back from the 20th never reach the 3rd
    let err = manager
        .create_rental(CreateRentalRequest {
            vehicle_id: 1,
            client_id: 10,
            staff_id: 2,
            start_date: day(2025, 1, 20),
            end_date: day(2025, 1, 21),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CreateRentalError::Indicator(IndicatorError::NotFoundInWindow { .. })
    ));
    assert!(manager.list_rentals().await.unwrap().is_empty());
    assert_eq!(manager.list_available_vehicles().await.unwrap().len(), 1);
}

#[tokio::test]
async fn finalized_rental_frees_the_vehicle_for_the_next_booking() {
    let server = indicator_api().await;
    let manager = setup(&server).await;

    let request = CreateRentalRequest {
        vehicle_id: 1,
        client_id: 10,
        staff_id: 2,
        start_date: day(2025, 1, 3),
        end_date: day(2025, 1, 4),
    };
    let first = manager.create_rental(request.clone()).await.unwrap();
    manager.finalize_rental(first.id).await.unwrap();

    let second = manager.create_rental(request).await.unwrap();
    assert_ne!(first.id, second.id);

    let on_the_3rd = manager.list_rentals_by_date(day(2025, 1, 3)).await.unwrap();
    assert_eq!(on_the_3rd.len(), 2);
    assert_eq!(on_the_3rd[0].id, first.id);
    assert_eq!(on_the_3rd[0].status, RentalStatus::Finalized);
}

async fn vehicle_status(manager: &Manager, id: i64) -> VehicleStatus {
    manager
        .store()
        .database()
        .vehicles()
        .get_by_id(id)
        .await
        .unwrap()
        .unwrap()
        .status
}
