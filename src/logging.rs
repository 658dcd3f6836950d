//! Tracing subscriber setup for the `rowmapper` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application. Events go to stderr so command output on stdout stays
//! machine-readable.

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging at the `warn` level.
///
/// # Environment Variables
/// - `RUST_LOG` - Log level filter, overrides the level argument
#[cfg(feature = "logging")]
pub fn init() {
    init_with_level("warn")
}

/// Initialize logging with a specific level
///
/// # Arguments
/// * `level` - Filter directive (`trace`, `debug`, `info`, `warn`, `error`,
///   or a full `EnvFilter` expression such as `rowmapper::entity=trace`)
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize logging for tests. Safe to call from every test.
#[cfg(feature = "logging")]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

// Stub implementations when logging feature is disabled
#[cfg(not(feature = "logging"))]
pub fn init() {}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
