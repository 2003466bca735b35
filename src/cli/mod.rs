//! CLI command handlers

pub mod commands;

pub use commands::{inspect, process, InspectFormat};

use tracing_subscriber::EnvFilter;

/// Install the global log subscriber. `RUST_LOG` wins over `default_level`.
///
/// Logs go to stderr so that `--json` and `--format` output stays parseable.
pub fn init_tracing(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
