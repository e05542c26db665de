#![forbid(unsafe_code)]

//! Stderr diagnostics for the demo binary.
//!
//! Greetings go to stdout; everything logged through `tracing` goes to stderr
//! so the greeting lines stay byte-exact. The filter comes from `KVO_LOG`
//! (same syntax as `RUST_LOG`) and defaults to `warn`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "KVO_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Build the filter from `KVO_LOG`, falling back to [`DEFAULT_FILTER`] when
/// the variable is unset or unparsable.
#[must_use]
pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
