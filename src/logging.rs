//! Global `tracing` subscriber setup for the `sales` binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "sales_insights=info";

/// Initializes the global subscriber: human-readable or JSON lines, on stderr.
///
/// Stdout stays reserved for the report. Safe to call more than once; later
/// calls are ignored.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("global subscriber already set");
    }
}
