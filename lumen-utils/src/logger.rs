//! Process wide logging setup.
//!
//! Library crates only emit through the `log` and `tracing` macros. Binaries call [`init`]
//! once to install a `tracing` subscriber and forward `log` records into it.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// The filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this twice is harmless; the
/// second call only reports that a subscriber already exists.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true));

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        tracing::warn!("tracing subscriber already installed: {err}");
        return;
    }

    // Forward `log` records from the library crates into the subscriber.
    if let Err(err) = tracing_log::LogTracer::init() {
        tracing::warn!("log forwarding already installed: {err}");
    }
}
