//! Logging setup.
//!
//! Logs go to **stderr** so they never interleave with anything the host
//! reads from stdout. Filtering follows `SENTRY_PROVIDER_LOG`, falling back
//! to `RUST_LOG`, then to `info`.
//!
//! ```bash
//! SENTRY_PROVIDER_LOG=sentry_provider=debug ./sentry-provider check
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "SENTRY_PROVIDER_LOG";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Install the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(filter("info"))
        .with(layer())
        .init();
}

/// Install the global subscriber, returning false if one is already set.
pub fn try_init_logging() -> bool {
    try_init_logging_with_default("info")
}

/// Like [`try_init_logging`] with a custom default level.
pub fn try_init_logging_with_default(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_twice() {
        let _ = try_init_logging_with_default("warn");
        assert!(!try_init_logging());
    }
}
