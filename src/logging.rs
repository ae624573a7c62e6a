//! Subscriber setup for the `tracing` events emitted by this crate.
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Installs a formatted subscriber for the host application.
///
/// The filter comes from `RUST_LOG` (for example
/// `RUST_LOG=rusty_marks=debug` to see every transferred row) and defaults to
/// `info`. Does nothing if a global subscriber is already installed.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Debug-level subscriber writing through the test harness.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
