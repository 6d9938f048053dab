use tgram_core::Update;

/// Messages whose text starts with this go through command routing.
pub const COMMAND_PREFIX: char = '/';

/// Routable payload of an update and the subject patterns are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified<'a> {
    /// Message text, `""` when the message has none.
    Message(&'a str),
    /// Callback data, `""` when the query has none.
    Callback(&'a str),
}

impl<'a> Classified<'a> {
    /// Text patterns are matched against.
    pub fn subject(&self) -> &'a str {
        match *self {
            Classified::Message(subject) | Classified::Callback(subject) => subject,
        }
    }

    /// Message starting with [`COMMAND_PREFIX`]; callbacks never are.
    pub fn is_command(&self) -> bool {
        matches!(self, Classified::Message(subject) if subject.starts_with(COMMAND_PREFIX))
    }
}

/// Message wins over callback query; every other payload is unroutable (`None`).
pub fn classify(update: &Update) -> Option<Classified<'_>> {
    if let Some(message) = &update.message {
        return Some(Classified::Message(message.text.as_deref().unwrap_or("")));
    }
    update
        .callback_query
        .as_ref()
        .map(|query| Classified::Callback(query.data.as_deref().unwrap_or("")))
}
