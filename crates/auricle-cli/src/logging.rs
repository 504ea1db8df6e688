//! Log subscriber setup.
//!
//! Logs go to stderr so `--json` output on stdout stays parseable.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Filter used for `--verbose`.
pub const VERBOSE_FILTER: &str = "debug";

/// Picks the filter directive: `--verbose` wins, then `RUST_LOG`, then the default.
pub fn filter_for(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Repeated calls are ignored.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
