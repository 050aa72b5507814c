use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rentcar_core::error::AppError;
use rentcar_core::token::TokenService;
use rentcar_core::traits::{
    CarStore, CatalogStore, HealthCheck, ReservationStore, RoleStore, TokenDenylist, UserStore,
};
use rentcar_core::MemoryDenylist;
use rentcar_db::Database;

use crate::config::{DenylistBackend, ServerConfig};

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
///
/// Stores are trait objects so the router runs unchanged over PostgreSQL or
/// the in-memory test store.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub cars: Arc<dyn CarStore>,
    pub reservations: Arc<dyn ReservationStore>,
    pub health: Arc<dyn HealthCheck>,
    pub tokens: TokenService,
    pub store_timeout: Duration,
    pub refresh_revokes_previous: bool,
}

impl AppState {
    /// Wire every store to PostgreSQL and the denylist to the configured backend.
    pub fn from_database(db: &Database, config: &ServerConfig) -> Self {
        let denylist: Arc<dyn TokenDenylist> = match config.denylist {
            DenylistBackend::Memory => Arc::new(MemoryDenylist::new()),
            DenylistBackend::Postgres => Arc::new(db.revoked_token_repo()),
        };
        let roles = Arc::new(db.role_repo());

        Self {
            users: Arc::new(db.user_repo()),
            roles: roles.clone(),
            catalog: roles,
            cars: Arc::new(db.car_repo()),
            reservations: Arc::new(db.reservation_repo()),
            health: Arc::new(db.clone()),
            tokens: TokenService::new(config.jwt_secret.as_bytes(), config.jwt_ttl, denylist),
            store_timeout: config.store_timeout,
            refresh_revokes_previous: config.refresh_revokes_previous,
        }
    }

    /// Run a store call under the configured timeout.
    pub async fn timed<T>(
        &self,
        call: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| AppError::Timeout(self.store_timeout.as_secs()))?
    }
}
