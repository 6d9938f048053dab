//! Routing rules: which registered handlers run for a classified update, and running them.

use std::sync::Arc;

use tgram_core::{Api, Result, Update};
use tracing::{debug, info, warn};

use crate::classifier::{classify, Classified};
use crate::event::Event;
use crate::handler::Handler;
use crate::registry::{HandlerEntry, Registry};

/// Branch the dispatcher took for one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Command matched the group registered under `pattern`.
    Command { pattern: String },
    /// Command matched no group; unconditional command handlers ran.
    UnmatchedCommand,
    Message,
    Callback,
    /// Neither a message nor a callback query; nothing ran.
    Unroutable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub update_id: i64,
    pub route: Route,
    /// Handlers that ran to completion
    pub invoked: usize,
}

/// Owns the frozen registry and the API handle passed to every [`Event`].
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    api: Arc<dyn Api>,
}

fn matching(entries: &[HandlerEntry], subject: &str) -> Vec<Arc<dyn Handler>> {
    entries
        .iter()
        .filter(|entry| entry.matches(subject))
        .map(|entry| entry.handler.clone())
        .collect()
}

impl Dispatcher {
    /// Freezes `registry`; `api` is handed to every event.
    pub fn new(registry: Registry, api: Arc<dyn Api>) -> Self {
        Self {
            registry: Arc::new(registry),
            api,
        }
    }

    /// Registrations this dispatcher routes over.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Outbound API shared with handlers.
    pub fn api(&self) -> &Arc<dyn Api> {
        &self.api
    }

    /// Selects the handlers for a classified update, in the order they must run.
    ///
    /// Commands: the first group (in key order) whose pattern matches, and only that group;
    /// otherwise every unconditional command handler. Plain messages and callbacks: every
    /// entry that matches or has no pattern, without short-circuiting.
    pub fn plan(&self, classified: Classified<'_>) -> (Route, Vec<Arc<dyn Handler>>) {
        let subject = classified.subject();
        match classified {
            Classified::Message(_) if classified.is_command() => {
                match self
                    .registry
                    .command_groups()
                    .iter()
                    .find(|group| group.pattern().is_match(subject))
                {
                    Some(group) => (
                        Route::Command {
                            pattern: group.pattern().as_str().to_string(),
                        },
                        group.handlers().to_vec(),
                    ),
                    None => (
                        Route::UnmatchedCommand,
                        self.registry.any_command_handlers().to_vec(),
                    ),
                }
            }
            Classified::Message(_) => (
                Route::Message,
                matching(self.registry.message_entries(), subject),
            ),
            Classified::Callback(_) => (
                Route::Callback,
                matching(self.registry.callback_entries(), subject),
            ),
        }
    }

    /// Runs the planned handlers one after another.
    ///
    /// The first handler error is returned as-is and the remaining handlers are skipped;
    /// the caller decides whether the update counts as processed.
    pub async fn dispatch(&self, update: Update) -> Result<DispatchReport> {
        let update_id = update.update_id;
        let (route, handlers) = match classify(&update) {
            Some(classified) => self.plan(classified),
            None => {
                debug!(update_id, kind = %update.kind(), "step: unroutable update dropped");
                return Ok(DispatchReport {
                    update_id,
                    route: Route::Unroutable,
                    invoked: 0,
                });
            }
        };

        info!(
            update_id,
            route = ?route,
            handler_count = handlers.len(),
            "step: dispatch started"
        );

        let event = Event::new(update, self.api.clone());
        for (index, handler) in handlers.iter().enumerate() {
            debug!(update_id, handler = index, "step: handler processing");
            if let Err(e) = handler.handle(&event).await {
                warn!(
                    update_id,
                    handler = index,
                    error = %e,
                    "step: handler failed, remaining handlers skipped"
                );
                return Err(e);
            }
        }

        debug!(update_id, invoked = handlers.len(), "step: dispatch finished");
        Ok(DispatchReport {
            update_id,
            route,
            invoked: handlers.len(),
        })
    }
}
