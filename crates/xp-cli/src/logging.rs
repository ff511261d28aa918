//! Logging setup.
//!
//! The subscriber is installed before configuration is read, so that
//! configuration loading itself is logged. The configured level is swapped
//! in afterwards unless `--verbose` or `RUST_LOG` already chose one.

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Level used until configuration is loaded.
pub const DEFAULT_LEVEL: &str = "info";

/// Picks the filter directive: `--verbose`, then `RUST_LOG`, then `fallback`.
#[must_use]
pub fn directive(verbose: bool, rust_log: Option<&str>, fallback: &str) -> String {
    if verbose {
        return "debug".to_string();
    }
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Handle to the installed filter.
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    pinned: bool,
}

impl LogHandle {
    /// Applies the configured level unless the command line or environment
    /// already fixed one.
    pub fn apply_config(&self, level: &str) {
        if self.pinned {
            return;
        }
        if let Err(e) = self.handle.reload(EnvFilter::new(level)) {
            tracing::warn!(level, error = %e, "could not apply configured log level");
        }
    }
}

/// Installs the global subscriber writing to stderr.
pub fn init(verbose: bool) -> LogHandle {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let pinned = verbose || rust_log.as_deref().is_some_and(|v| !v.trim().is_empty());
    let filter = EnvFilter::new(directive(verbose, rust_log.as_deref(), DEFAULT_LEVEL));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    LogHandle { handle, pinned }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_wins() {
        assert_eq!(directive(true, Some("warn"), "error"), "debug");
    }

    #[test]
    fn rust_log_beats_fallback() {
        assert_eq!(directive(false, Some("xp=trace"), "info"), "xp=trace");
        assert_eq!(directive(false, Some("  "), "warn"), "warn");
        assert_eq!(directive(false, None, "warn"), "warn");
    }

    #[test]
    fn reload_swaps_the_level() {
        let (filter, handle) = reload::Layer::new(EnvFilter::new("error"));
        let subscriber = tracing_subscriber::registry().with(filter);
        let logging = LogHandle {
            handle,
            pinned: false,
        };

        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(tracing::Level::DEBUG));
            logging.apply_config("debug");
            assert!(tracing::enabled!(tracing::Level::DEBUG));
        });
    }

    #[test]
    fn pinned_level_ignores_configuration() {
        let (filter, handle) = reload::Layer::new(EnvFilter::new("error"));
        let subscriber = tracing_subscriber::registry().with(filter);
        let logging = LogHandle {
            handle,
            pinned: true,
        };

        tracing::subscriber::with_default(subscriber, || {
            logging.apply_config("debug");
            assert!(!tracing::enabled!(tracing::Level::DEBUG));
        });
    }
}
