//! Tracing subscriber setup.
//!
//! The core crate only emits events; this is the one place a subscriber is
//! installed.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initializes the global subscriber.
///
/// ## Filter Precedence
/// - `RUST_LOG` when set and valid
/// - `config.filter` otherwise (`TRIPLEDGER_LOG` has already been folded
///   into it by [`LedgerConfig::load`](crate::config::LedgerConfig::load))
/// - `info` when the configured directives do not parse
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &LoggingConfig) {
    let filter = build_filter(config);

    if config.json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
