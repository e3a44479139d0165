//! Tracing bootstrap.
//!
//! Libraries in this workspace only emit `tracing` events. Binaries and
//! tests that want to see them call [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::TrustConfig;

/// Install a global `fmt` subscriber filtered by `filter`.
///
/// `RUST_LOG`, when set, takes precedence over `filter`. Returns `false` if a
/// global subscriber was already installed, which makes repeated calls from
/// tests harmless.
pub fn init_tracing(filter: &str, json: bool) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true);
    if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

/// [`init_tracing`] driven by a loaded [`TrustConfig`].
pub fn init_from_config(config: &TrustConfig) -> bool {
    init_tracing(&config.log_filter, config.log_json)
}
