pub mod car_repository;
pub mod config;
pub mod database;
pub mod reservation_repository;
pub mod revoked_token_repository;
pub mod role_repository;
pub mod user_repository;

pub use car_repository::CarRepository;
pub use config::DatabaseConfig;
pub use database::Database;
pub use reservation_repository::ReservationRepository;
pub use revoked_token_repository::RevokedTokenRepository;
pub use role_repository::RoleRepository;
pub use user_repository::UserRepository;

/// Map a sqlx error, turning unique-constraint violations into conflicts.
pub(crate) fn map_db_error(err: sqlx::Error) -> rentcar_core::AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            rentcar_core::AppError::Conflict(db.message().to_string())
        }
        _ => rentcar_core::AppError::DatabaseError(err.to_string()),
    }
}
