use rentcar_core::traits::{CarStore, ReservationStore, UserStore};

use crate::integration::common::{new_car, new_user, setup_test_db};

#[tokio::test]
async fn list_for_user_joins_car_and_filters_by_owner() {
    let (db, _container) = setup_test_db().await;
    let owner = db.user_repo().create(new_user("owner@example.com")).await.unwrap();
    let other = db.user_repo().create(new_user("other@example.com")).await.unwrap();
    let car = db.car_repo().create(new_car(2, 1)).await.unwrap();

    for user_id in [owner.id, owner.id, other.id] {
        sqlx::query(
            r#"INSERT INTO reservations (user_id, car_id, start_date, end_date)
               VALUES ($1, $2, '2026-01-10', '2026-01-12')"#,
        )
        .bind(user_id)
        .bind(car.id)
        .execute(db.pool())
        .await
        .unwrap();
    }

    let reservations = db.reservation_repo().list_for_user(owner.id).await.unwrap();

    assert_eq!(reservations.len(), 2);
    assert!(reservations.iter().all(|r| r.user_id == owner.id));
    assert!(reservations[0].id > reservations[1].id);
    let joined = reservations[0].car.as_ref().unwrap();
    assert_eq!(joined.id, car.id);
    assert_eq!(joined.plate_number, car.plate_number);

    let none = db.reservation_repo().list_for_user(owner.id + 100).await.unwrap();
    assert!(none.is_empty());
}
