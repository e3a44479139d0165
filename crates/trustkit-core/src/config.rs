//! Runtime configuration for the trust pipeline.
//!
//! Defaults suit an in-process deployment. Override via environment
//! variables or explicit construction in tests.

use serde::Deserialize;

/// Default number of digests held by the digest cache.
pub const DEFAULT_DIGEST_CACHE_SIZE: usize = 1024;

/// Default status-list capacity in bits (16 KiB of packed bits).
pub const DEFAULT_STATUS_LIST_CAPACITY: usize = 131_072;

/// Process-wide settings consumed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Maximum number of cached digests. 0 disables caching.
    pub digest_cache_size: usize,
    /// Capacity used when a status list is created without one.
    pub default_status_list_capacity: usize,
    /// `tracing` filter directive, e.g. `info` or `trustkit_status=debug`.
    pub log_filter: String,
    /// Emit JSON log lines instead of human-readable output.
    pub log_json: bool,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            digest_cache_size: DEFAULT_DIGEST_CACHE_SIZE,
            default_status_list_capacity: DEFAULT_STATUS_LIST_CAPACITY,
            log_filter: "info".to_string(),
            log_json: false,
        }
    }
}

impl TrustConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TRUSTKIT_DIGEST_CACHE_SIZE` (default: 1024)
    /// - `TRUSTKIT_STATUS_LIST_CAPACITY` (default: 131072)
    /// - `TRUSTKIT_LOG` (default: `info`)
    /// - `TRUSTKIT_LOG_JSON` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            digest_cache_size: env_parse("TRUSTKIT_DIGEST_CACHE_SIZE", defaults.digest_cache_size)?,
            default_status_list_capacity: env_parse(
                "TRUSTKIT_STATUS_LIST_CAPACITY",
                defaults.default_status_list_capacity,
            )?,
            log_filter: std::env::var("TRUSTKIT_LOG").unwrap_or(defaults.log_filter),
            log_json: env_parse("TRUSTKIT_LOG_JSON", defaults.log_json)?,
        })
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}
