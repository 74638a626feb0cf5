//! Diagnostic tracing for the harness.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. It is separate from
//! the run artifacts (`output.txt`, captured results), which are always written
//! regardless of the log level.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with a `warn` default.
///
/// # Example
/// ```bash
/// RUST_LOG=harness=debug judge run solution.cpp
/// ```
pub fn init() {
    init_with_default("warn");
}

/// Initialize the tracing subscriber, falling back to `default_directive` when
/// `RUST_LOG` is unset or invalid.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_with_default(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
