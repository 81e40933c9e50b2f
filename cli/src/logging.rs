//! Log subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an explicit log filter, e.g. `devport_core=debug`.
const LOG_ENV: &str = "DEVPORT_LOG";

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .init();
}
