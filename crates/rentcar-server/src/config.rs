use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rentcar_core::AppError;

/// HS256 needs a key at least as long as its output.
const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime (365 days).
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Where revoked token ids are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenylistBackend {
    /// Process-local cache. Revocations are lost on restart.
    #[default]
    Memory,
    /// The `revoked_tokens` table, shared by every instance.
    Postgres,
}

impl FromStr for DenylistBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(DenylistBackend::Memory),
            "postgres" => Ok(DenylistBackend::Postgres),
            other => Err(format!("Unknown token denylist backend: {other}")),
        }
    }
}

impl fmt::Display for DenylistBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenylistBackend::Memory => f.write_str("memory"),
            DenylistBackend::Postgres => f.write_str("postgres"),
        }
    }
}

/// Server settings read from the environment.
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    /// Revoke the presented token when a refresh succeeds.
    pub refresh_revokes_previous: bool,
    /// Upper bound for any single persistence call.
    pub store_timeout: Duration,
    pub denylist: DenylistBackend,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `RENTCAR_HOST` (default `0.0.0.0`), `RENTCAR_PORT` (default 3000)
    /// - `JWT_SECRET` (required, at least 32 bytes)
    /// - `JWT_TTL_SECS` (default 3600, at most 365 days)
    /// - `JWT_REFRESH_REVOKES_PREVIOUS` (default false)
    /// - `STORE_TIMEOUT_SECS` (default 5)
    /// - `TOKEN_DENYLIST` (`memory` or `postgres`, default `memory`)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| {
            AppError::ConfigError("JWT_SECRET not set. Required to sign tokens.".into())
        })?;
        if jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(AppError::ConfigError(format!(
                "JWT_SECRET must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }

        let port = match lookup("RENTCAR_PORT") {
            None => 3000,
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::ConfigError(format!("Invalid RENTCAR_PORT '{raw}'"))
            })?,
        };

        let denylist = match lookup("TOKEN_DENYLIST") {
            None => DenylistBackend::default(),
            Some(raw) => raw
                .parse::<DenylistBackend>()
                .map_err(AppError::ConfigError)?,
        };

        let jwt_ttl = positive(&lookup, "JWT_TTL_SECS", 3600)?;
        if jwt_ttl > MAX_TTL_SECS {
            return Err(AppError::ConfigError(format!(
                "JWT_TTL_SECS must be at most {MAX_TTL_SECS}"
            )));
        }

        let refresh_revokes_previous = match lookup("JWT_REFRESH_REVOKES_PREVIOUS") {
            None => false,
            Some(raw) => parse_bool("JWT_REFRESH_REVOKES_PREVIOUS", &raw)?,
        };

        Ok(Self {
            host: lookup("RENTCAR_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            jwt_secret,
            jwt_ttl: Duration::from_secs(jwt_ttl),
            refresh_revokes_previous,
            store_timeout: Duration::from_secs(positive(&lookup, "STORE_TIMEOUT_SECS", 5)?),
            denylist,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl", &self.jwt_ttl)
            .field("refresh_revokes_previous", &self.refresh_revokes_previous)
            .field("store_timeout", &self.store_timeout)
            .field("denylist", &self.denylist)
            .finish()
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> Result<u64, AppError> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(format!("{name} must be at least 1"))),
        Ok(value) => Ok(value),
        Err(_) => Err(AppError::ConfigError(format!(
            "Invalid {name} '{raw}': must be a positive integer"
        ))),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::ConfigError(format!(
            "Invalid {name} '{raw}': expected true or false"
        ))),
    }
}
