//! API server configuration.

use chrono::Duration;
use keeper_core::auth::tokens::{ACCESS_TOKEN_EXPIRY_SECS, REFRESH_TOKEN_EXPIRY_DAYS, SessionSettings};

use crate::services::auth::resolve_jwt_secret;
use crate::services::cookies::CookieSettings;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access and refresh token lifetimes.
    pub session: SessionSettings,
    /// Mark session cookies `Secure` (set when served over HTTPS).
    pub cookie_secure: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default                                   |
    /// |--------------------------|-------------------------------------------|
    /// | `BIND_ADDR`              | `127.0.0.1:8080`                          |
    /// | `DATABASE_URL`           | `postgres://localhost:5432/keeper`        |
    /// | `JWT_SECRET_KEY` / `JWT_SECRET` | generated & persisted to file      |
    /// | `ACCESS_TOKEN_TTL_SECS`  | `900`                                     |
    /// | `REFRESH_TOKEN_TTL_SECS` | `2592000` (30 days)                       |
    /// | `COOKIE_SECURE`          | `false`                                   |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/keeper".into()),
            jwt_secret: resolve_jwt_secret(),
            session: SessionSettings {
                access_ttl: env_ttl(
                    "ACCESS_TOKEN_TTL_SECS",
                    Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS),
                ),
                refresh_ttl: env_ttl(
                    "REFRESH_TOKEN_TTL_SECS",
                    Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
                ),
            },
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Cookie attributes derived from this configuration.
    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            secure: self.cookie_secure,
            ..CookieSettings::default()
        }
    }
}

/// Longest token lifetime accepted from the environment.
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

fn env_ttl(var: &str, default: Duration) -> Duration {
    parse_ttl(std::env::var(var).ok().as_deref(), default)
}

/// Positive whole seconds up to [`MAX_TOKEN_TTL_DAYS`], else `default`.
fn parse_ttl(raw: Option<&str>, default: Duration) -> Duration {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|secs| *secs > 0)
        .and_then(Duration::try_seconds)
        .filter(|ttl| *ttl <= Duration::days(MAX_TOKEN_TTL_DAYS))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
