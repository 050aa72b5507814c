use async_trait::async_trait;
use sqlx::{PgPool, Pool, Postgres};

use rentcar_core::error::AppError;
use rentcar_core::models::{CarStatus, CarType, Role};
use rentcar_core::traits::{CatalogStore, RoleStore};

use crate::map_db_error;

/// Read-only access to the reference tables: roles, car types, car statuses.
#[derive(Clone)]
pub struct RoleRepository {
    pool: Pool<Postgres>,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_car_types(&self) -> Result<Vec<CarType>, AppError> {
        let rows: Vec<(i32, String)> =
            sqlx::query_as(r#"SELECT id, name FROM car_types ORDER BY id"#)
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| CarType { id, name })
            .collect())
    }

    pub async fn list_car_statuses(&self) -> Result<Vec<CarStatus>, AppError> {
        let rows: Vec<(i32, String)> =
            sqlx::query_as(r#"SELECT id, name FROM car_statuses ORDER BY id"#)
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| CarStatus { id, name })
            .collect())
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, AppError> {
        let row: Option<(i32, String)> =
            sqlx::query_as(r#"SELECT id, role_name FROM roles WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(row.map(|(id, role_name)| Role { id, role_name }))
    }

    async fn find_by_name(&self, role_name: &str) -> Result<Option<Role>, AppError> {
        let row: Option<(i32, String)> =
            sqlx::query_as(r#"SELECT id, role_name FROM roles WHERE role_name = $1"#)
                .bind(role_name)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(row.map(|(id, role_name)| Role { id, role_name }))
    }
}

#[async_trait]
impl CatalogStore for RoleRepository {
    async fn car_type_exists(&self, id: i32) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM car_types WHERE id = $1)"#)
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(exists)
    }

    async fn car_status_exists(&self, id: i32) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM car_statuses WHERE id = $1)"#)
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(exists)
    }
}
