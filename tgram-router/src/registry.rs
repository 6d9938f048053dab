//! Handler registrations, built once at startup and immutable afterwards.

use std::sync::Arc;

use tgram_core::Result;
use tracing::debug;

use crate::handler::Handler;
use crate::pattern::Pattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerClass {
    Command,
    Message,
    Callback,
}

/// One message or callback registration. `pattern: None` matches every subject.
#[derive(Clone)]
pub struct HandlerEntry {
    pub class: HandlerClass,
    pub pattern: Option<Pattern>,
    pub handler: Arc<dyn Handler>,
}

impl HandlerEntry {
    /// No pattern matches everything.
    pub fn matches(&self, subject: &str) -> bool {
        self.pattern.as_ref().map_or(true, |p| p.is_match(subject))
    }
}

/// Command handlers sharing one literal pattern string, in registration order.
#[derive(Clone)]
pub struct CommandGroup {
    pattern: Pattern,
    handlers: Vec<Arc<dyn Handler>>,
}

impl CommandGroup {
    /// Key of this group.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Handlers in registration order.
    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }
}

/// Frozen set of registrations.
///
/// Command groups keep the first-insertion order of their pattern keys; the unconditional
/// command list, message entries and callback entries keep registration order.
#[derive(Clone, Default)]
pub struct Registry {
    command_groups: Vec<CommandGroup>,
    any_command: Vec<Arc<dyn Handler>>,
    message: Vec<HandlerEntry>,
    callback: Vec<HandlerEntry>,
}

impl Registry {
    /// Empty builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Groups in first-insertion order of their keys.
    pub fn command_groups(&self) -> &[CommandGroup] {
        &self.command_groups
    }

    /// Group registered under exactly this pattern string.
    pub fn command_group(&self, pattern: &str) -> Option<&CommandGroup> {
        self.command_groups
            .iter()
            .find(|g| g.pattern.as_str() == pattern)
    }

    /// Command handlers registered without a pattern.
    pub fn any_command_handlers(&self) -> &[Arc<dyn Handler>] {
        &self.any_command
    }

    /// Plain message registrations in order.
    pub fn message_entries(&self) -> &[HandlerEntry] {
        &self.message
    }

    /// Callback registrations in order.
    pub fn callback_entries(&self) -> &[HandlerEntry] {
        &self.callback
    }

    /// Total number of registered handlers across all classes.
    pub fn len(&self) -> usize {
        self.command_groups
            .iter()
            .map(|g| g.handlers.len())
            .sum::<usize>()
            + self.any_command.len()
            + self.message.len()
            + self.callback.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self
            .command_groups
            .iter()
            .map(|g| g.pattern.as_str())
            .collect();
        f.debug_struct("Registry")
            .field("command_groups", &keys)
            .field("any_command", &self.any_command.len())
            .field("message", &self.message.len())
            .field("callback", &self.callback.len())
            .finish()
    }
}

/// Collects registrations. Appends only: no de-duplication, no removal.
#[derive(Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handler` to `class`. Fails only when `pattern` is not a valid regex.
    pub fn register(
        mut self,
        class: HandlerClass,
        pattern: Option<&str>,
        handler: Arc<dyn Handler>,
    ) -> Result<Self> {
        let compiled = pattern.map(Pattern::new).transpose()?;
        debug!(class = ?class, pattern = ?pattern, "step: register handler");

        let registry = &mut self.registry;
        match (class, compiled) {
            (HandlerClass::Command, None) => registry.any_command.push(handler),
            (HandlerClass::Command, Some(pattern)) => {
                match registry
                    .command_groups
                    .iter()
                    .position(|g| g.pattern.as_str() == pattern.as_str())
                {
                    Some(index) => registry.command_groups[index].handlers.push(handler),
                    None => registry.command_groups.push(CommandGroup {
                        pattern,
                        handlers: vec![handler],
                    }),
                }
            }
            (HandlerClass::Message, pattern) => registry.message.push(HandlerEntry {
                class,
                pattern,
                handler,
            }),
            (HandlerClass::Callback, pattern) => registry.callback.push(HandlerEntry {
                class,
                pattern,
                handler,
            }),
        }
        Ok(self)
    }

    /// Command handler; `None` runs for every command no specific pattern matched.
    pub fn command(self, pattern: Option<&str>, handler: Arc<dyn Handler>) -> Result<Self> {
        self.register(HandlerClass::Command, pattern, handler)
    }

    /// Plain-text message handler; `None` matches every non-command message.
    pub fn on_message(self, pattern: Option<&str>, handler: Arc<dyn Handler>) -> Result<Self> {
        self.register(HandlerClass::Message, pattern, handler)
    }

    /// Callback query handler matched against the callback data.
    pub fn on_callback(self, pattern: Option<&str>, handler: Arc<dyn Handler>) -> Result<Self> {
        self.register(HandlerClass::Callback, pattern, handler)
    }

    /// Freezes the registrations.
    pub fn build(self) -> Registry {
        self.registry
    }
}
