//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `PYPATH_LOG=pypath=trace`.
pub const LOG_ENV: &str = "PYPATH_LOG";

/// Install the global fmt subscriber writing to stderr. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let fallback = if verbose { "pypath=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
