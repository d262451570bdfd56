//! File logging for fidemo
//!
//! Logs go to `$XDG_STATE_HOME/fidemo/fidemo.log` with daily rotation so
//! stdout stays free for command output.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_PREFIX: &str = "fidemo.log";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Dependencies stay at `warn`
/// unless `RUST_LOG` says otherwise.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .max_log_files(config.max_files.max(1))
        .build(&log_dir)
        .map_err(|e| Error::Config(format!("failed to create log appender: {}", e)))?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let directive = default_directive(&config.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    tracing::info!(
        log_dir = %log_dir.display(),
        max_files = config.max_files,
        %directive,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Filter directive for our own crates at `level`.
///
/// Unknown levels fall back to `info`.
fn default_directive(level: &str) -> String {
    let level = level
        .trim()
        .parse::<tracing::Level>()
        .map(|l| l.to_string().to_lowercase())
        .unwrap_or_else(|_| "info".to_string());
    format!("warn,fidemo={level},fidemo_core={level}")
}

/// Flushes pending log lines when dropped.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}
