//! Diagnostics subscriber setup.
//!
//! Request log lines go to the logger's sink. This module only configures
//! `tracing` for the crate's own diagnostics (config parsing, degraded
//! values, server lifecycle).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "request_logger=info,tower_http=info";

/// Install the global subscriber. Diagnostics go to stderr so they never
/// interleave with request lines on stdout. Safe to call more than once.
pub fn init(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
