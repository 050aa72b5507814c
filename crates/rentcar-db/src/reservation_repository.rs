use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use rentcar_core::error::AppError;
use rentcar_core::models::{Car, Reservation};
use rentcar_core::traits::ReservationStore;

use crate::map_db_error;

/// Read access to reservations, joined with the reserved car.
#[derive(Clone)]
pub struct ReservationRepository {
    pool: Pool<Postgres>,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: i64,
    user_id: i64,
    car_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    created_at: DateTime<Utc>,
    car_name: String,
    car_year: i32,
    car_plate_number: String,
    car_type_id: i32,
    car_passenger_capacity: i32,
    car_daily_rate: i64,
    car_photo_url: Option<String>,
    car_status_id: i32,
    car_transmission: String,
    car_created_at: DateTime<Utc>,
    car_updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = AppError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let car = Car {
            id: row.car_id,
            name: row.car_name,
            year: row.car_year,
            plate_number: row.car_plate_number,
            type_id: row.car_type_id,
            passenger_capacity: row.car_passenger_capacity,
            daily_rate: row.car_daily_rate,
            photo_url: row.car_photo_url,
            status_id: row.car_status_id,
            transmission: row
                .car_transmission
                .parse()
                .map_err(AppError::DatabaseError)?,
            created_at: row.car_created_at,
            updated_at: row.car_updated_at,
        };
        Ok(Reservation {
            id: row.id,
            user_id: row.user_id,
            car_id: row.car_id,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            car: Some(car),
        })
    }
}

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Reservation>, AppError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT r.id, r.user_id, r.car_id, r.start_date, r.end_date, r.created_at,
                   c.name AS car_name, c.year AS car_year, c.plate_number AS car_plate_number,
                   c.type_id AS car_type_id, c.passenger_capacity AS car_passenger_capacity,
                   c.daily_rate AS car_daily_rate, c.photo_url AS car_photo_url,
                   c.status_id AS car_status_id, c.transmission AS car_transmission,
                   c.created_at AS car_created_at, c.updated_at AS car_updated_at
            FROM reservations r
            JOIN cars c ON c.id = r.car_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Reservation::try_from).collect()
    }
}
