//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence when set. Otherwise the crate logs at `debug`
//! with debug logging enabled in settings and at `info` without.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive for the given debug-logging setting
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "coretray_metrics=debug,info"
    } else {
        "info"
    }
}

/// Installs a global fmt subscriber
///
/// Returns `false` when a global subscriber was already installed.
pub fn init(debug: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .is_ok()
}
