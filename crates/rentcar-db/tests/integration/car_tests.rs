use rentcar_core::models::{CarUpdate, Transmission};
use rentcar_core::traits::{CarStore, CatalogStore};
use uuid::Uuid;

use crate::integration::common::{new_car, setup_test_db};

#[tokio::test]
async fn create_then_find_round_trips_fields() {
    let (db, _container) = setup_test_db().await;
    let repo = db.car_repo();

    let input = new_car(1, 1);
    let created = repo.create(input.clone()).await.unwrap();
    let fetched = repo.find(created.id).await.unwrap().unwrap();

    assert_eq!(fetched.name, input.name);
    assert_eq!(fetched.year, input.year);
    assert_eq!(fetched.plate_number, input.plate_number);
    assert_eq!(fetched.type_id, input.type_id);
    assert_eq!(fetched.passenger_capacity, input.passenger_capacity);
    assert_eq!(fetched.daily_rate, input.daily_rate);
    assert_eq!(fetched.photo_url, input.photo_url);
    assert_eq!(fetched.status_id, input.status_id);
    assert_eq!(fetched.transmission, input.transmission);
}

#[tokio::test]
async fn long_name_and_plate_are_stored_whole() {
    let (db, _container) = setup_test_db().await;
    let repo = db.car_repo();

    let mut input = new_car(2, 1);
    input.name = "Avanza ".repeat(50);
    input.plate_number = "B".repeat(40);
    let created = repo.create(input.clone()).await.unwrap();

    assert_eq!(created.name, input.name);
    assert_eq!(created.plate_number, input.plate_number);
}

#[tokio::test]
async fn find_missing_returns_none() {
    let (db, _container) = setup_test_db().await;

    assert!(db.car_repo().find(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_filters_by_type_and_status() {
    let (db, _container) = setup_test_db().await;
    let repo = db.car_repo();

    repo.create(new_car(1, 1)).await.unwrap();
    repo.create(new_car(1, 2)).await.unwrap();
    repo.create(new_car(2, 2)).await.unwrap();

    assert_eq!(repo.list().await.unwrap().len(), 3);
    assert_eq!(repo.list_by_type(1).await.unwrap().len(), 2);
    assert_eq!(repo.list_by_type(3).await.unwrap().len(), 0);
    assert_eq!(repo.list_by_status(2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_applies_partial_fields_and_clears_photo() {
    let (db, _container) = setup_test_db().await;
    let repo = db.car_repo();

    let mut input = new_car(1, 1);
    input.photo_url = Some("https://cdn.example.com/a.jpg".to_string());
    let car = repo.create(input).await.unwrap();

    let update = CarUpdate {
        daily_rate: Some(500_000),
        transmission: Some(Transmission::Automatic),
        photo_url: Some(None),
        ..Default::default()
    };
    let updated = repo.update(car.id, update).await.unwrap().unwrap();

    assert_eq!(updated.daily_rate, 500_000);
    assert_eq!(updated.transmission, Transmission::Automatic);
    assert_eq!(updated.photo_url, None);
    assert_eq!(updated.name, car.name);

    let untouched = repo
        .update(car.id, CarUpdate::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.daily_rate, 500_000);

    assert!(
        repo.update(Uuid::new_v4(), CarUpdate::default())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn delete_reports_whether_a_row_went_away() {
    let (db, _container) = setup_test_db().await;
    let repo = db.car_repo();

    let car = repo.create(new_car(1, 1)).await.unwrap();

    assert!(repo.delete(car.id).await.unwrap());
    assert!(!repo.delete(car.id).await.unwrap());
    assert!(repo.find(car.id).await.unwrap().is_none());
}

#[tokio::test]
async fn catalog_existence_checks() {
    let (db, _container) = setup_test_db().await;
    let catalog = db.role_repo();

    assert!(catalog.car_type_exists(1).await.unwrap());
    assert!(!catalog.car_type_exists(99).await.unwrap());
    assert!(catalog.car_status_exists(3).await.unwrap());
    assert!(!catalog.car_status_exists(0).await.unwrap());
}
