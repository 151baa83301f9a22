//! Logging setup utilities for the Agora server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Every crate in `targets` gets `default_log_level`. The filter can be
/// overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `targets` - Crate/binary names to enable (e.g., `["agora_server", "agora_shared"]`)
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use agora_shared::logger::setup_logger;
///
/// setup_logger(&["agora_server"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    let default_filter = build_default_filter(targets, default_log_level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build an `EnvFilter` directive string such as `agora_server=debug,tower_http=debug`.
fn build_default_filter(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}
