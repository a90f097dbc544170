//! Diagnostic logging setup
//!
//! Logs go to stderr so stdout stays reserved for the conversation.

use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Default filter directive for a verbosity level
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "wattbuddy=info,warn",
        Verbosity::VeryVerbose => "wattbuddy=debug,info",
    }
}

/// Install the global subscriber; `RUST_LOG` wins over `verbosity`
pub fn init(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
