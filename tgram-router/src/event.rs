//! What a handler receives: the full update plus access to the outbound API.

use std::sync::Arc;

use tgram_core::{
    AnswerCallbackQuery, Api, ApiExt, CallbackQuery, ChatId, EditMessageText, HandlerError,
    Message, MessageOrTrue, Result, SendMessage, Update,
};

/// Cheap to clone; every handler of one update sees the same underlying update.
#[derive(Clone)]
pub struct Event {
    update: Arc<Update>,
    api: Arc<dyn Api>,
}

impl Event {
    /// Wraps one decoded update.
    pub fn new(update: Update, api: Arc<dyn Api>) -> Self {
        Self {
            update: Arc::new(update),
            api,
        }
    }

    /// The full update as received.
    pub fn update(&self) -> &Update {
        &self.update
    }

    /// Raw API access for calls without a helper.
    pub fn api(&self) -> &Arc<dyn Api> {
        &self.api
    }

    /// Id of the wrapped update.
    pub fn update_id(&self) -> i64 {
        self.update.update_id
    }

    /// Incoming message, if this update carries one.
    pub fn message(&self) -> Option<&Message> {
        self.update.message.as_ref()
    }

    /// Callback query, if a button was pressed.
    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        self.update.callback_query.as_ref()
    }

    /// Full message text as received; pattern captures are not applied.
    pub fn text(&self) -> Option<&str> {
        self.message().and_then(|m| m.text.as_deref())
    }

    /// Callback data as received.
    pub fn callback_data(&self) -> Option<&str> {
        self.callback_query().and_then(|q| q.data.as_deref())
    }

    /// Message this event acts on: the incoming message, or the one the pressed button belongs to.
    fn target_message(&self) -> Option<&Message> {
        self.message().or_else(|| {
            self.callback_query()
                .and_then(|q| q.message.as_deref())
        })
    }

    /// Chat of the target message.
    pub fn chat_id(&self) -> Option<i64> {
        self.target_message().map(|m| m.chat.id)
    }

    /// Sender of the message, or the user who pressed the button.
    pub fn user_id(&self) -> Option<i64> {
        if let Some(from) = self.message().and_then(|m| m.from.as_ref()) {
            return Some(from.id);
        }
        self.callback_query().map(|q| q.from.id)
    }

    /// `sendMessage` request addressed to this event's chat, for further customisation.
    pub fn new_message(&self, text: impl Into<String>) -> Result<SendMessage> {
        let chat_id = self.chat_id().ok_or(HandlerError::NoChat)?;
        Ok(SendMessage::new(chat_id, text))
    }

    /// Sends a prepared request, see [`Event::new_message`].
    pub async fn send_message_with(&self, request: SendMessage) -> Result<Message> {
        self.api.send_message(&request).await
    }

    /// Plain text to the event's chat.
    pub async fn send_message(&self, text: impl Into<String>) -> Result<Message> {
        let request = self.new_message(text)?;
        self.send_message_with(request).await
    }

    /// Sends to the same chat, quoting the incoming message when there is one.
    pub async fn reply(&self, text: impl Into<String>) -> Result<Message> {
        let mut request = self.new_message(text)?;
        if let Some(message) = self.message() {
            request = request.reply_to(message.message_id);
        }
        self.send_message_with(request).await
    }

    /// Edits the target message, or the inline message a callback came from.
    pub async fn edit_message(&self, text: impl Into<String>) -> Result<MessageOrTrue> {
        let request = match self.target_message() {
            Some(message) => EditMessageText::new(message.chat.id, message.message_id, text),
            None => {
                let inline_id = self
                    .callback_query()
                    .and_then(|q| q.inline_message_id.clone())
                    .ok_or(HandlerError::NoMessage)?;
                EditMessageText::inline(inline_id, text)
            }
        };
        self.api.edit_message_text(&request).await
    }

    /// Deletes the target message.
    pub async fn delete_message(&self) -> Result<bool> {
        let message = self.target_message().ok_or(HandlerError::NoMessage)?;
        self.api
            .delete_message(ChatId::Id(message.chat.id), message.message_id)
            .await
    }

    /// Answers the callback query (stops the client's loading indicator).
    pub async fn answer_callback(&self, text: Option<&str>) -> Result<bool> {
        let query = self.callback_query().ok_or(HandlerError::NoCallbackQuery)?;
        let mut request = AnswerCallbackQuery::new(query.id.clone());
        if let Some(text) = text {
            request = request.text(text);
        }
        self.api.answer_callback_query(&request).await
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("update", &self.update)
            .finish_non_exhaustive()
    }
}
