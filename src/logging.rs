//! Tracing subscriber setup for the binary

use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Filter directive for a verbosity level. `RUST_LOG` only applies at the
/// default verbosity; explicit -q/-v flags win.
pub fn filter_directive(verbosity: Verbosity, default_level: &str, env: Option<&str>) -> String {
    match verbosity {
        Verbosity::Quiet => "error".to_string(),
        Verbosity::Normal => env
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(default_level)
            .to_string(),
        Verbosity::Verbose => "info".to_string(),
        Verbosity::VeryVerbose => "debug".to_string(),
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for routine output.
pub fn init(verbosity: Verbosity, default_level: &str) {
    let env = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(verbosity, default_level, env.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (tests, embedding in another binary) is not an error
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
