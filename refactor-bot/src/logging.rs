//! Tracing setup for developer diagnostics.
//!
//! Diagnostics go to stderr and are controlled by `RUST_LOG`. Product output
//! (command echo, reply previews, outcome lines) is plain stdout and never
//! routed through tracing, so CI logs stay stable regardless of filter.

use tracing_subscriber::EnvFilter;

/// Initialize the stderr subscriber. Defaults to `warn` when `RUST_LOG` is
/// unset.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
