//! # tgram-polling
//!
//! Drives the engine: [`Poller`] fetches batches with `getUpdates`, dispatches each update
//! in order and advances the cursor only after a successful dispatch (at-least-once).
//! [`Bot`] owns the dispatcher and stop handle and also accepts pushed (webhook) updates.
//!
//! Known hazard: a handler that keeps failing on one update blocks every later update,
//! because the cursor never moves past it. Handlers should catch their own errors, or set
//! [`PollingConfig::max_update_failures`] to dead-letter such updates.

mod bot;
mod config;
mod poller;
mod runner;
mod stop;

pub use bot::Bot;
pub use config::{PollingConfig, DEFAULT_ALLOWED_UPDATES};
pub use poller::{Poller, PollerState};
pub use runner::run;
pub use stop::StopHandle;
