use async_trait::async_trait;
use rentcar_core::AppError;
use rentcar_core::traits::HealthCheck;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::car_repository::CarRepository;
use crate::config::DatabaseConfig;
use crate::reservation_repository::ReservationRepository;
use crate::revoked_token_repository::RevokedTokenRepository;
use crate::role_repository::RoleRepository;
use crate::user_repository::UserRepository;

/// Database handle: owns the connection pool, runs migrations
/// and hands out repositories.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn role_repo(&self) -> RoleRepository {
        RoleRepository::new(self.pool.clone())
    }

    pub fn car_repo(&self) -> CarRepository {
        CarRepository::new(self.pool.clone())
    }

    pub fn reservation_repo(&self) -> ReservationRepository {
        ReservationRepository::new(self.pool.clone())
    }

    pub fn revoked_token_repo(&self) -> RevokedTokenRepository {
        RevokedTokenRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HealthCheck for Database {
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
