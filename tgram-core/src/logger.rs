//! Tracing setup. Events always go to stdout; a log file gets a second, ANSI-free copy
//! when a path is configured.

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Level used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs the global tracing subscriber.
///
/// `log_file_path: None` logs to stdout only. With a path, the file is opened in append
/// mode (created if missing) and receives the same events. The level comes from `RUST_LOG`
/// (e.g. `tgram_polling=debug`), default [`DEFAULT_LOG_LEVEL`]; load `.env` first if
/// `RUST_LOG` lives there.
///
/// Fails if the file cannot be opened or a global subscriber is already set.
pub fn init_tracing(log_file_path: Option<&str>) -> anyhow::Result<()> {
    let file_layer = match log_file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_level(true);

    Registry::default()
        .with(env_filter())
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    tracing::debug!(log_file = ?log_file_path, "step: tracing initialized");
    Ok(())
}
