use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use rentcar_core::error::AppError;
use rentcar_core::models::{Car, CarUpdate, NewCar};
use rentcar_core::traits::CarStore;

use crate::map_db_error;

/// Repository for the car inventory in PostgreSQL.
#[derive(Clone)]
pub struct CarRepository {
    pool: Pool<Postgres>,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, column: Filter, value: i32) -> Result<Vec<Car>, AppError> {
        let sql = match column {
            Filter::Type => r#"SELECT * FROM cars WHERE type_id = $1 ORDER BY created_at, id"#,
            Filter::Status => r#"SELECT * FROM cars WHERE status_id = $1 ORDER BY created_at, id"#,
        };
        let rows = sqlx::query_as::<_, CarRow>(sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.into_iter().map(Car::try_from).collect()
    }
}

#[derive(Clone, Copy)]
enum Filter {
    Type,
    Status,
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    name: String,
    year: i32,
    plate_number: String,
    type_id: i32,
    passenger_capacity: i32,
    daily_rate: i64,
    photo_url: Option<String>,
    status_id: i32,
    transmission: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CarRow> for Car {
    type Error = AppError;

    fn try_from(row: CarRow) -> Result<Self, Self::Error> {
        Ok(Car {
            id: row.id,
            name: row.name,
            year: row.year,
            plate_number: row.plate_number,
            type_id: row.type_id,
            passenger_capacity: row.passenger_capacity,
            daily_rate: row.daily_rate,
            photo_url: row.photo_url,
            status_id: row.status_id,
            transmission: row.transmission.parse().map_err(AppError::DatabaseError)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl CarStore for CarRepository {
    async fn create(&self, car: NewCar) -> Result<Car, AppError> {
        let row = sqlx::query_as::<_, CarRow>(
            r#"
            INSERT INTO cars (name, year, plate_number, type_id, passenger_capacity,
                              daily_rate, photo_url, status_id, transmission)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&car.name)
        .bind(car.year)
        .bind(&car.plate_number)
        .bind(car.type_id)
        .bind(car.passenger_capacity)
        .bind(car.daily_rate)
        .bind(&car.photo_url)
        .bind(car.status_id)
        .bind(car.transmission.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.try_into()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Car>, AppError> {
        let row = sqlx::query_as::<_, CarRow>(r#"SELECT * FROM cars WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Car::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Car>, AppError> {
        let rows = sqlx::query_as::<_, CarRow>(r#"SELECT * FROM cars ORDER BY created_at, id"#)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.into_iter().map(Car::try_from).collect()
    }

    async fn list_by_type(&self, type_id: i32) -> Result<Vec<Car>, AppError> {
        self.list_where(Filter::Type, type_id).await
    }

    async fn list_by_status(&self, status_id: i32) -> Result<Vec<Car>, AppError> {
        self.list_where(Filter::Status, status_id).await
    }

    async fn update(&self, id: Uuid, update: CarUpdate) -> Result<Option<Car>, AppError> {
        // $8 says whether photo_url was supplied at all, so NULL can clear it.
        let (photo_supplied, photo_url) = match update.photo_url {
            Some(url) => (true, url),
            None => (false, None),
        };
        let row = sqlx::query_as::<_, CarRow>(
            r#"
            UPDATE cars
            SET name = COALESCE($2, name),
                year = COALESCE($3, year),
                plate_number = COALESCE($4, plate_number),
                type_id = COALESCE($5, type_id),
                passenger_capacity = COALESCE($6, passenger_capacity),
                daily_rate = COALESCE($7, daily_rate),
                photo_url = CASE WHEN $8 THEN $9 ELSE photo_url END,
                status_id = COALESCE($10, status_id),
                transmission = COALESCE($11, transmission),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name)
        .bind(update.year)
        .bind(update.plate_number)
        .bind(update.type_id)
        .bind(update.passenger_capacity)
        .bind(update.daily_rate)
        .bind(photo_supplied)
        .bind(photo_url)
        .bind(update.status_id)
        .bind(update.transmission.map(|t| t.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Car::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM cars WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
