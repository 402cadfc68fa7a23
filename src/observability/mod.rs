//! Observability and telemetry.
//!
//! Structured logging via `tracing`. Metrics are recorded through the
//! `metrics` facade at the call sites; wiring an exporter is left to the
//! embedding application.

use std::sync::OnceLock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling the log filter.
pub const LOG_FILTER_ENV: &str = "SCANLEDGER_LOG";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Newline-delimited JSON output.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConfig {
    /// Whether debug-level output was requested via CLI.
    pub verbose: bool,
    /// Output format.
    pub format: LogFormat,
}

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes the global tracing subscriber.
///
/// The filter comes from `SCANLEDGER_LOG` when set, otherwise `debug` with
/// `verbose` and `info` without. Logs go to stderr so they never interleave
/// with rendered scan results on stdout. Safe to call more than once; only
/// the first call installs a subscriber.
pub fn init(config: LoggingConfig) {
    INIT.get_or_init(|| {
        let default_directive = if config.verbose { "debug" } else { "info" };
        let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        let registry = tracing_subscriber::registry().with(filter);

        match config.format {
            LogFormat::Text => {
                let _ = registry
                    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                    .try_init();
            },
            LogFormat::Json => {
                let _ = registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .try_init();
            },
        }
    });
}
