//! Gateway-level errors (service lifecycle, not per-request).
//!
//! Per-request failures never surface as errors past the handlers; they
//! are converted into the HTTP response shapes in `routes`.

/// Service-level gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<crate::config::ConfigError> for GatewayError {
    fn from(e: crate::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
