//! Process entry point: logging, bot construction, Ctrl-C wiring, polling.

use anyhow::Result;
use tgram_client::TelegramConfig;
use tgram_core::init_tracing;
use tgram_router::Registry;
use tracing::info;

use crate::bot::Bot;
use crate::config::PollingConfig;

/// Runs a polling bot until Ctrl-C.
///
/// Installs the global tracing subscriber (stdout, plus `telegram.log_file` when set), so
/// call it at most once per process. Startup failures (invalid config, a long-poll timeout
/// that the request timeout cannot cover, unreachable API while dropping the backlog) are
/// returned before polling begins.
pub async fn run(
    telegram: TelegramConfig,
    polling: PollingConfig,
    registry: Registry,
) -> Result<()> {
    init_tracing(telegram.log_file.as_deref())?;
    telegram.validate()?;
    polling.check_request_timeout(telegram.request_timeout)?;

    info!(
        handlers = registry.len(),
        drop_pending_updates = polling.drop_pending_updates,
        timeout_secs = polling.timeout_secs,
        "step: bot starting"
    );

    let bot = Bot::from_config(&telegram, registry)?;
    let ctrl_c = bot.stop_handle().stop_on_ctrl_c();
    let result = bot.run_polling(polling).await;
    ctrl_c.abort();
    result?;

    info!("step: bot stopped");
    Ok(())
}
