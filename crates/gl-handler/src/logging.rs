//! Process-wide `tracing` subscriber setup.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "GL_HANDLER_LOG";

const DEFAULT_FILTER: &str = "info";

static INIT: Once = Once::new();

/// Resolve the filter directive: config, then `GL_HANDLER_LOG`, then
/// `RUST_LOG`, then `info`.
pub fn filter_directive(config: &LoggingConfig) -> String {
    config
        .filter
        .clone()
        .or_else(|| std::env::var(LOG_ENV).ok())
        .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install a fmt subscriber once per process. Later calls are ignored, as
/// is a subscriber installed by someone else first.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let directive = filter_directive(config);
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(config.ansi)
            .with_target(true)
            .try_init()
            .is_ok();

        if installed {
            tracing::debug!(filter = %directive, "logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig {
            filter: Some("gl_handler=trace".into()),
            ansi: false,
        };
        assert_eq!(filter_directive(&config), "gl_handler=trace");
    }

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig::default();
        init_logging(&config);
        init_logging(&config);
    }
}
