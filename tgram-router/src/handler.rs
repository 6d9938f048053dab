use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tgram_core::Result;

use crate::event::Event;

/// User code run for a routed update. An error stops the remaining handlers for the update
/// and is returned to whoever called the dispatcher.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, event: &Event) -> Result<()>;
}

/// Adapts an async closure taking an owned [`Event`] into a [`Handler`].
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn handle(&self, event: &Event) -> Result<()> {
        (self.f)(event.clone()).await
    }
}

/// `handler_fn(|event| async move { ... })`
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}
