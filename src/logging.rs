//! Tracing subscriber setup
//!
//! Events go to stderr so `--format json` output on stdout stays parseable.
//! Filter precedence: `RUST_LOG`, then `--verbose` (debug), then the
//! configured `log_level`.

use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when the configured level does not parse
const FALLBACK_LEVEL: &str = "warn";

/// Installs the global subscriber
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(verbose: bool, log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { log_level };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
    });

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_writer(std::io::stderr),
        )
        .try_init();

    if result.is_ok() {
        debug!(verbose, log_level, "Logging initialized");
    }
}
