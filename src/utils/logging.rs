//! Diagnostic logging setup.
//!
//! Stdout carries the transcript, so diagnostics go to stderr. The filter is
//! read from `PRODEV_LOG` using the usual `EnvFilter` directive syntax
//! (for example `PRODEV_LOG=prodev=debug`).

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "PRODEV_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
