//! # tgram-router
//!
//! Routes decoded updates to registered handlers. A [`RegistryBuilder`] collects command,
//! message and callback registrations at startup and freezes them into a [`Registry`];
//! [`classify`] picks the routable payload and its match subject; the [`Dispatcher`] applies
//! the routing rules and runs the selected handlers sequentially with an [`Event`].

mod classifier;
mod dispatcher;
mod event;
mod handler;
mod pattern;
mod registry;

pub use classifier::{classify, Classified, COMMAND_PREFIX};
pub use dispatcher::{DispatchReport, Dispatcher, Route};
pub use event::Event;
pub use handler::{handler_fn, FnHandler, Handler};
pub use pattern::Pattern;
pub use registry::{CommandGroup, HandlerClass, HandlerEntry, Registry, RegistryBuilder};
