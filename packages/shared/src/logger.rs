//! Logging setup utilities for the Pixelwall binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Both the library crates and the binary are enabled at `default_log_level`.
/// The filter can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "pixelwall_server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use pixelwall_shared::logger::setup_logger;
///
/// setup_logger("pixelwall_server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the default `EnvFilter` directive string.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    [
        "pixelwall_shared",
        "pixelwall_server",
        "pixelwall_client",
        "tower_http",
    ]
    .iter()
    .copied()
    .chain(std::iter::once(binary_name))
    .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
    .collect::<Vec<_>>()
    .join(",")
}
