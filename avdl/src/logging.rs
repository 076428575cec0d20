//! Diagnostic tracing for the generator.
//!
//! Generated protocol files are the product output. Everything logged here
//! goes to stderr and is controlled by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`. `verbose` raises the default to
/// `info` so per-file progress (`Found N files`, `Processing ...`) is shown.
///
/// # Example
/// ```bash
/// RUST_LOG=avdl=debug avdl generate src/main/avro
/// ```
pub fn init(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
