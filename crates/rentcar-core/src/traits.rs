//! Storage interfaces consumed by the HTTP layer.
//!
//! Every trait is object-safe so the server can hold `Arc<dyn ...>` and swap
//! PostgreSQL repositories for the in-memory store in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Car, CarUpdate, NewCar, NewUser, ProfileUpdate, Reservation, Role, User,
};

/// Persisted user accounts (the credential store).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A duplicate email is [`AppError::Conflict`].
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Look up by already lower-cased email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Whether `email` belongs to any user other than `except`.
    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, AppError>;

    /// Apply a partial profile update. `None` if the user does not exist.
    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<User>, AppError>;
}

/// Immutable role reference data.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, AppError>;

    async fn find_by_name(&self, role_name: &str) -> Result<Option<Role>, AppError>;
}

/// Car category and status lookup tables.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn car_type_exists(&self, id: i32) -> Result<bool, AppError>;

    async fn car_status_exists(&self, id: i32) -> Result<bool, AppError>;
}

/// Car inventory.
#[async_trait]
pub trait CarStore: Send + Sync {
    async fn create(&self, car: NewCar) -> Result<Car, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Car>, AppError>;

    async fn list(&self) -> Result<Vec<Car>, AppError>;

    async fn list_by_type(&self, type_id: i32) -> Result<Vec<Car>, AppError>;

    async fn list_by_status(&self, status_id: i32) -> Result<Vec<Car>, AppError>;

    /// Apply a partial update. `None` if the car does not exist.
    async fn update(&self, id: Uuid, update: CarUpdate) -> Result<Option<Car>, AppError>;

    /// Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Read side of reservations.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// A user's reservations with their cars, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Reservation>, AppError>;
}

/// Record of revoked token identifiers, kept until each token's natural expiry.
#[async_trait]
pub trait TokenDenylist: Send + Sync {
    /// Record `jti` as revoked. `expires_at` is the first instant at which the
    /// token fails verification on its own; the entry may be dropped from then.
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError>;

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError>;
}

/// Liveness check for the backing store.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;
}
