//! Long-poll loop: fetch a batch, dispatch in order, advance the cursor per update.

use tgram_core::{ApiExt, GetUpdates, Result};
use tgram_router::Dispatcher;
use tracing::{debug, error, info, warn};

use crate::config::PollingConfig;
use crate::stop::StopHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Stopped,
    Running,
}

/// Single polling task. Fetches and handlers never overlap: update k+1 is dispatched only
/// after every handler of update k has finished.
pub struct Poller {
    dispatcher: Dispatcher,
    config: PollingConfig,
    stop: StopHandle,
    offset: Option<i64>,
    state: PollerState,
    /// Update id of the last failed dispatch and how many times in a row it failed
    last_failure: Option<(i64, u32)>,
}

impl Poller {
    /// Stopped poller with an unset cursor and its own stop flag.
    pub fn new(dispatcher: Dispatcher, config: PollingConfig) -> Self {
        Self {
            dispatcher,
            config,
            stop: StopHandle::new(),
            offset: None,
            state: PollerState::Stopped,
            last_failure: None,
        }
    }

    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Clone of the flag [`Poller::run`] checks.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Id of the next update to request; `None` until the first update was processed,
    /// `-1` right after the backlog was dropped.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Current loop state.
    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Loop settings.
    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    fn fetch_request(&self) -> GetUpdates {
        GetUpdates {
            offset: self.offset,
            limit: self.config.limit,
            timeout: Some(self.config.timeout_secs),
            allowed_updates: Some(self.config.allowed_updates.clone()),
        }
    }

    fn advance_past(&mut self, update_id: i64) {
        let next = update_id + 1;
        self.offset = Some(self.offset.map_or(next, |current| current.max(next)));
    }

    fn record_failure(&mut self, update_id: i64) -> u32 {
        let failures = match self.last_failure {
            Some((id, count)) if id == update_id => count + 1,
            _ => 1,
        };
        self.last_failure = Some((update_id, failures));
        failures
    }

    /// Throwaway fetch that skips the backlog: asks for the newest update only, without
    /// waiting, then parks the cursor at `-1`.
    ///
    /// The next fetch with `offset=-1` returns only the newest pending update, which is
    /// dispatched normally; everything older is gone. Meant for startup, before any update
    /// was processed.
    pub async fn drop_pending(&mut self) -> Result<()> {
        let request = GetUpdates {
            offset: Some(-1),
            limit: Some(1),
            timeout: Some(0),
            allowed_updates: None,
        };
        let updates = self.dispatcher.api().get_updates(&request).await?;
        self.offset = Some(-1);
        info!(
            newest = ?updates.last().map(|u| u.update_id),
            "step: pending updates dropped"
        );
        Ok(())
    }

    /// One iteration: fetch a batch and dispatch it in order. Returns the batch size.
    ///
    /// A dispatch error leaves the cursor on the failing update and is returned, so the
    /// next fetch delivers the same update again. With `max_update_failures` set, an update
    /// that failed that many times in a row is logged and skipped instead.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let request = self.fetch_request();
        debug!(offset = ?request.offset, timeout = ?request.timeout, "step: fetching updates");
        let updates = self.dispatcher.api().get_updates(&request).await?;
        let count = updates.len();
        if count > 0 {
            debug!(count, offset = ?self.offset, "step: batch received");
        }

        for update in updates {
            let update_id = update.update_id;
            match self.dispatcher.dispatch(update).await {
                Ok(report) => {
                    self.advance_past(update_id);
                    self.last_failure = None;
                    debug!(
                        update_id,
                        invoked = report.invoked,
                        offset = ?self.offset,
                        "step: update processed"
                    );
                }
                Err(e) => {
                    let failures = self.record_failure(update_id);
                    match self.config.max_update_failures {
                        Some(max) if failures >= max => {
                            error!(
                                update_id,
                                failures,
                                error = %e,
                                "step: update dead-lettered after repeated failures"
                            );
                            self.advance_past(update_id);
                            self.last_failure = None;
                        }
                        _ => return Err(e),
                    }
                }
            }
        }
        Ok(count)
    }

    /// Runs until the stop handle is set.
    ///
    /// With `drop_pending_updates`, the backlog is discarded first; if that fetch fails the
    /// error is returned and the poller never enters [`PollerState::Running`]. Inside the
    /// loop every error is logged and followed by one `interval` sleep.
    pub async fn run(&mut self) -> Result<()> {
        if self.config.drop_pending_updates {
            self.drop_pending().await?;
        }

        self.state = PollerState::Running;
        info!(
            offset = ?self.offset,
            timeout_secs = self.config.timeout_secs,
            "step: polling started"
        );

        while !self.stop.is_stopped() {
            if let Err(e) = self.poll_once().await {
                if e.is_remote() {
                    warn!(error = %e, offset = ?self.offset, "Polling error");
                } else {
                    error!(
                        error = %e,
                        offset = ?self.offset,
                        "Polling error; the failing update will be fetched again"
                    );
                }
                tokio::time::sleep(self.config.interval).await;
            }
        }

        self.state = PollerState::Stopped;
        info!(offset = ?self.offset, "step: polling stopped");
        Ok(())
    }
}
