use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use rentcar_core::error::AppError;
use rentcar_core::traits::TokenDenylist;

use crate::map_db_error;

/// Shared token denylist for deployments running several server instances.
#[derive(Clone)]
pub struct RevokedTokenRepository {
    pool: Pool<Postgres>,
}

impl RevokedTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete entries whose tokens have expired on their own.
    pub async fn prune_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query(r#"DELETE FROM revoked_tokens WHERE expires_at <= NOW()"#)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TokenDenylist for RevokedTokenRepository {
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO UPDATE SET expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        let pruned = self.prune_expired().await?;
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned expired token revocations");
        }
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let (revoked,): (bool,) = sqlx::query_as(
            r#"SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1 AND expires_at > NOW())"#,
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(revoked)
    }
}
