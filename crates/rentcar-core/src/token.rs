//! Bearer token minting, verification, refresh and revocation.
//!
//! Tokens are HS256 JWTs carrying `sub` (user id), `iat`, `exp` and a random
//! `jti`. Validity is decided by signature and expiry alone, except for
//! tokens whose `jti` sits in the [`TokenDenylist`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::traits::TokenDenylist;

/// Why a presented token was rejected or could not be produced.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    /// Bad signature, wrong algorithm, or revoked.
    #[error("Token is invalid")]
    Invalid,

    /// Not a structurally valid JWT, or the claims do not decode.
    #[error("Token could not be parsed")]
    Malformed,

    #[error("Failed to sign token: {0}")]
    Encoding(String),

    #[error("Token denylist unavailable: {0}")]
    Denylist(#[source] AppError),
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id, decimal).
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Token id, the denylist key.
    pub jti: Uuid,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Malformed)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// First instant at which [`Self::is_expired_at`] holds. `exp` has
    /// one-second resolution and the token is still accepted during that
    /// second, so a revocation must outlive `exp` by one second.
    pub fn rejected_from(&self) -> DateTime<Utc> {
        self.expires_at()
            .checked_add_signed(chrono::Duration::seconds(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A freshly minted token and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Sole authority for minting and verifying bearer tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    denylist: Arc<dyn TokenDenylist>,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration, denylist: Arc<dyn TokenDenylist>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
            denylist,
        }
    }

    /// Configured lifetime of every issued token.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Lifetime in seconds, as reported to clients in `expires_in`.
    pub fn expires_in(&self) -> u64 {
        self.ttl.as_secs()
    }

    /// Mint a token for `user_id` expiring one TTL from now.
    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| TokenError::Encoding(format!("TTL out of range: {e}")))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(ttl)
                .ok_or_else(|| TokenError::Encoding("TTL out of range".into()))?
                .timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = self.sign(&claims)?;
        tracing::debug!(user_id, jti = %claims.jti, "Issued token");
        Ok(IssuedToken { token, claims })
    }

    /// Verify a token and return the user id it is bound to.
    pub async fn verify(&self, token: &str) -> Result<i64, TokenError> {
        self.verify_claims(token).await?.user_id()
    }

    /// Verify a token and return its claims.
    ///
    /// Order: signature and structure first, then expiry, then revocation.
    pub async fn verify_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode_signed(token)?;
        claims.user_id()?;
        if claims.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }
        let revoked = self
            .denylist
            .is_revoked(claims.jti)
            .await
            .map_err(TokenError::Denylist)?;
        if revoked {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    /// Mint a replacement token for the same subject. The presented token
    /// must verify; it stays valid unless [`Self::invalidate`] is called.
    pub async fn refresh(&self, token: &str) -> Result<IssuedToken, TokenError> {
        let claims = self.verify_claims(token).await?;
        self.issue(claims.user_id()?)
    }

    /// Revoke a token until its natural expiry. Any correctly signed token is
    /// accepted; revoking one that already expired is a no-op.
    pub async fn invalidate(&self, token: &str) -> Result<(), TokenError> {
        let claims = self.decode_signed(token)?;
        if claims.is_expired_at(Utc::now()) {
            return Ok(());
        }
        self.denylist
            .revoke(claims.jti, claims.rejected_from())
            .await
            .map_err(TokenError::Denylist)?;
        tracing::debug!(jti = %claims.jti, sub = %claims.sub, "Revoked token");
        Ok(())
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Signature-checked decode that leaves expiry to the caller.
    fn decode_signed(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::MissingAlgorithm => TokenError::Invalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
