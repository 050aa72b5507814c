//! Process-local token denylist.
//!
//! Suitable for single-instance deployments. Each entry lives exactly as long
//! as the token it revokes; once the token would have expired anyway the
//! entry is evicted by the cache. There is no capacity bound: dropping a live
//! entry would let a logged-out token verify again.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;
use uuid::Uuid;

use crate::error::AppError;
use crate::traits::TokenDenylist;

struct UntilTokenExpiry;

impl Expiry<Uuid, DateTime<Utc>> for UntilTokenExpiry {
    fn expire_after_create(
        &self,
        _key: &Uuid,
        expires_at: &DateTime<Utc>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(remaining(*expires_at))
    }
}

fn remaining(expires_at: DateTime<Utc>) -> Duration {
    (expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
}

/// In-memory [`TokenDenylist`] backed by a concurrent moka cache.
#[derive(Clone)]
pub struct MemoryDenylist {
    entries: Cache<Uuid, DateTime<Utc>>,
}

impl MemoryDenylist {
    pub fn new() -> Self {
        let entries = Cache::builder().expire_after(UntilTokenExpiry).build();
        Self { entries }
    }
}

impl Default for MemoryDenylist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenDenylist for MemoryDenylist {
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        if expires_at <= Utc::now() {
            return Ok(());
        }
        self.entries.insert(jti, expires_at).await;
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        Ok(self.entries.contains_key(&jti))
    }
}
