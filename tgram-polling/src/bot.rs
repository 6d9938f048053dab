//! Bot aggregate: one API handle, one frozen registry inside the dispatcher, one stop flag.

use std::sync::Arc;

use tgram_client::{ApiClient, TelegramConfig};
use tgram_core::{Api, Result, Update};
use tgram_router::{DispatchReport, Dispatcher, Registry};
use tracing::debug;

use crate::config::PollingConfig;
use crate::poller::Poller;
use crate::stop::StopHandle;

pub struct Bot {
    dispatcher: Dispatcher,
    stop: StopHandle,
}

impl Bot {
    /// Bot over any [`Api`] implementation.
    pub fn new(api: Arc<dyn Api>, registry: Registry) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry, api),
            stop: StopHandle::new(),
        }
    }

    /// Bot backed by the HTTP executor.
    pub fn from_config(config: &TelegramConfig, registry: Registry) -> Result<Self> {
        let client = ApiClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), registry))
    }

    /// Outbound API.
    pub fn api(&self) -> &Arc<dyn Api> {
        self.dispatcher.api()
    }

    /// Dispatcher shared by pollers and pushed updates.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Frozen registrations.
    pub fn registry(&self) -> &Registry {
        self.dispatcher.registry()
    }

    /// Clone of the stop flag shared with pollers.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Asks a running poller to stop after its current iteration.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Poller sharing this bot's dispatcher and stop flag.
    pub fn poller(&self, config: PollingConfig) -> Poller {
        Poller::new(self.dispatcher.clone(), config).with_stop_handle(self.stop.clone())
    }

    /// Polls until [`Bot::stop`] is called.
    pub async fn run_polling(&self, config: PollingConfig) -> Result<()> {
        self.poller(config).run().await
    }

    /// Pushed update (e.g. a webhook body), same routing as polled updates.
    pub async fn process_update(&self, update: Update) -> Result<DispatchReport> {
        self.dispatcher.dispatch(update).await
    }

    /// Decodes one update JSON body and dispatches it.
    pub async fn process_update_json(&self, body: &[u8]) -> Result<DispatchReport> {
        let update: Update = serde_json::from_slice(body)?;
        debug!(update_id = update.update_id, "step: pushed update decoded");
        self.process_update(update).await
    }
}
