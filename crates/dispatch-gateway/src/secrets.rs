//! Rotatable webhook secrets with TTL-based, content-hash-validated caching.
//!
//! The platform credentials (verify token + subscription id) live in a file
//! on a mounted volume and rotate out-of-band. The cache keeps the hot path
//! free of per-request file I/O: within the TTL window reads are a shared
//! lock and two field copies; after expiry one writer re-hashes the file and
//! only reparses when the content actually changed. Stale-but-valid data is
//! always preferable to an error, so once a load has succeeded transient
//! read or parse failures never propagate to request handling.

use parking_lot::RwLock;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Standard secret volume mount path.
pub const DEFAULT_SECRETS_PATH: &str = "/etc/secrets/strava_auth.json";

/// Default staleness budget before the file is re-checked.
pub const DEFAULT_SECRET_CACHE_TTL: Duration = Duration::from_secs(300);

/// Structure of the mounted secrets file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StravaSecrets {
    /// Token the platform presents during the subscription handshake.
    pub webhook_verify_token: String,
    /// Subscription id echoed back on every event delivery.
    #[serde(deserialize_with = "loose_i64")]
    pub webhook_subscription_id: i64,
}

/// Accept the subscription id as a JSON integer or a float.
///
/// Rotation tooling has historically written the id as a float; a
/// non-integral value is truncated, not rejected (existing behavior,
/// deliberately not tightened).
fn loose_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|f| f as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("not a representable integer: {number}")))
}

/// The secrets file could not be read or parsed and no previously loaded
/// value exists to fall back on.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// Cold start with no usable secrets source.
    #[error("secrets unavailable at {path}: {cause}")]
    Unavailable {
        /// Path the cache was pointed at.
        path: PathBuf,
        /// Underlying read or parse failure.
        cause: String,
    },
}

#[derive(Debug, Default)]
struct CacheState {
    verify_token: String,
    subscription_id: i64,
    content_hash: Option<String>,
    last_check: Option<Instant>,
    /// Whether any load (file or seed) has ever succeeded.
    loaded: bool,
}

/// TTL-based secret cache with content-hash rotation detection.
///
/// Instance-scoped and dependency-injected; the lock belongs to the
/// instance, so tests can run independent caches side by side.
pub struct SecretCache {
    secrets_path: PathBuf,
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl SecretCache {
    /// Create a cache over the given file with the given TTL.
    pub fn new(secrets_path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            secrets_path: secrets_path.into(),
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Create a cache with the default mount path and TTL.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SECRETS_PATH, DEFAULT_SECRET_CACHE_TTL)
    }

    /// Create a cache pre-populated with environment-provided values.
    ///
    /// The seed counts as a successful load, so a deployment without the
    /// mounted file still serves the env pair. The file takes precedence
    /// whenever it becomes readable: the seed carries no `last_check`, so
    /// the first request goes to the slow path and loads it.
    pub fn with_seed(
        secrets_path: impl Into<PathBuf>,
        ttl: Duration,
        seed: Option<StravaSecrets>,
    ) -> Self {
        let cache = Self::new(secrets_path, ttl);
        if let Some(seed) = seed {
            let mut state = cache.state.write();
            state.verify_token = seed.webhook_verify_token;
            state.subscription_id = seed.webhook_subscription_id;
            state.loaded = true;
        }
        cache
    }

    /// Return the current `(verify_token, subscription_id)` pair.
    ///
    /// Fast path (TTL not expired): the cached pair under a shared lock,
    /// no I/O. Slow path: re-hash the file under the exclusive lock, reparse
    /// only on content change, and fall back to the last-known-good pair on
    /// any failure. Concurrent expired readers collapse onto one refresh:
    /// the lock serializes them and late waiters see the fresh `last_check`.
    pub fn get_secrets(&self) -> Result<(String, i64), SecretError> {
        let now = Instant::now();

        {
            let state = self.state.read();
            if state.loaded && is_fresh(state.last_check, now, self.ttl) {
                return Ok((state.verify_token.clone(), state.subscription_id));
            }
        }

        let mut state = self.state.write();

        // Another expired reader may have refreshed while we waited.
        if state.loaded && is_fresh(state.last_check, now, self.ttl) {
            return Ok((state.verify_token.clone(), state.subscription_id));
        }

        let bytes = match std::fs::read(&self.secrets_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %self.secrets_path.display(), error = %e, "Failed to read secrets file");
                return self.stale_or_error(&state, e.to_string());
            }
        };

        let current_hash = hex::encode(Sha256::digest(&bytes));

        // Content changed or first load
        if state.content_hash.as_deref() != Some(current_hash.as_str()) {
            match serde_json::from_slice::<StravaSecrets>(&bytes) {
                Ok(secrets) => {
                    state.verify_token = secrets.webhook_verify_token;
                    state.subscription_id = secrets.webhook_subscription_id;
                    state.content_hash = Some(current_hash);
                    state.loaded = true;
                    info!("Secrets reloaded due to content change");
                }
                Err(e) => {
                    warn!(path = %self.secrets_path.display(), error = %e, "Failed to parse secrets file");
                    return self.stale_or_error(&state, e.to_string());
                }
            }
        }

        state.last_check = Some(now);
        Ok((state.verify_token.clone(), state.subscription_id))
    }

    /// Stale-serve if a good value exists; hard error only on cold start.
    ///
    /// Deliberately leaves `last_check` untouched so the next request
    /// retries the file instead of waiting out a fresh TTL window.
    fn stale_or_error(
        &self,
        state: &CacheState,
        cause: String,
    ) -> Result<(String, i64), SecretError> {
        if state.loaded {
            return Ok((state.verify_token.clone(), state.subscription_id));
        }
        Err(SecretError::Unavailable {
            path: self.secrets_path.clone(),
            cause,
        })
    }

    /// Path this cache reads from.
    pub fn path(&self) -> &Path {
        &self.secrets_path
    }
}

fn is_fresh(last_check: Option<Instant>, now: Instant, ttl: Duration) -> bool {
    last_check.is_some_and(|at| now.duration_since(at) < ttl)
}
