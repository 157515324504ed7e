//! Gateway configuration from environment variables.

use crate::secrets::{StravaSecrets, DEFAULT_SECRETS_PATH, DEFAULT_SECRET_CACHE_TTL};
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration error raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable holds an unparseable value.
    #[error("invalid value for {var}: {reason}")]
    InvalidValue {
        /// Name of the offending variable.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Main gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address.
    pub host: IpAddr,
    /// Bind port.
    pub port: u16,
    /// Mounted secrets file location.
    pub secrets_path: PathBuf,
    /// Staleness budget for the secret cache.
    pub secret_cache_ttl: Duration,
    /// Env-provided verify token; overridden by the mounted file.
    pub verify_token: Option<String>,
    /// Env-provided subscription id; overridden by the mounted file.
    pub subscription_id: Option<i64>,
    /// Log verbosity level.
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            secrets_path: PathBuf::from(DEFAULT_SECRETS_PATH),
            secret_cache_ttl: DEFAULT_SECRET_CACHE_TTL,
            verify_token: None,
            subscription_id: None,
            log_level: "info".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized: `HOST`, `PORT`, `STRAVA_SECRETS_PATH`,
    /// `SECRET_CACHE_TTL_SECS`, `STRAVA_WEBHOOK_VERIFY_TOKEN`,
    /// `STRAVA_WEBHOOK_SUBSCRIPTION_ID`, `LOG_LEVEL`. All optional; the
    /// env-provided secret pair only seeds the cache and yields to the
    /// mounted file when that is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = parse_env("HOST", defaults.host)?;
        let port = parse_env("PORT", defaults.port)?;
        let secrets_path = env::var("STRAVA_SECRETS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.secrets_path);
        let ttl_secs: u64 = parse_env(
            "SECRET_CACHE_TTL_SECS",
            defaults.secret_cache_ttl.as_secs(),
        )?;

        let verify_token = env::var("STRAVA_WEBHOOK_VERIFY_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());
        let subscription_id = match env::var("STRAVA_WEBHOOK_SUBSCRIPTION_ID") {
            Ok(raw) if !raw.is_empty() => {
                Some(
                    raw.parse::<i64>()
                        .map_err(|e| ConfigError::InvalidValue {
                            var: "STRAVA_WEBHOOK_SUBSCRIPTION_ID",
                            reason: e.to_string(),
                        })?,
                )
            }
            _ => None,
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            host,
            port,
            secrets_path,
            secret_cache_ttl: Duration::from_secs(ttl_secs),
            verify_token,
            subscription_id,
            log_level,
        })
    }

    /// Socket address to bind.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Env-provided secret pair, if any, used as the cache seed so a
    /// deployment without the mounted file still authenticates.
    pub fn seed_secrets(&self) -> Option<StravaSecrets> {
        if self.verify_token.is_none() && self.subscription_id.is_none() {
            return None;
        }
        Some(StravaSecrets {
            webhook_verify_token: self.verify_token.clone().unwrap_or_default(),
            webhook_subscription_id: self.subscription_id.unwrap_or_default(),
        })
    }
}

fn parse_env<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) if !raw.is_empty() => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            reason: e.to_string(),
        }),
        _ => Ok(default),
    }
}
