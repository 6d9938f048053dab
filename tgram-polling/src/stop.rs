use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Process-wide stop flag. Checked by the poller once per loop iteration, so an in-flight
/// fetch or handler always finishes first.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    /// Flag in the not-stopped state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag; every clone sees it.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// True once any clone called [`StopHandle::stop`].
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Sets the flag when Ctrl-C is received.
    pub fn stop_on_ctrl_c(&self) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("step: ctrl-c received, stopping after current iteration");
                    handle.stop();
                }
                Err(e) => warn!(error = %e, "Failed to listen for ctrl-c"),
            }
        })
    }
}
