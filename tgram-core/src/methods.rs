//! Request bodies for the outbound Bot API methods.
//!
//! Optional fields serialize as `null` and are stripped by the executor before sending,
//! so `Some(false)` and `Some(0)` still reach the server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Message;

/// Numeric chat id or `@channelusername`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        ChatId::Id(id)
    }
}

impl From<&str> for ChatId {
    fn from(username: &str) -> Self {
        ChatId::Username(username.to_string())
    }
}

impl From<String> for ChatId {
    fn from(username: String) -> Self {
        ChatId::Username(username)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub reply_markup: Option<Value>,
    pub reply_to_message_id: Option<i64>,
    pub disable_notification: Option<bool>,
    pub disable_web_page_preview: Option<bool>,
}

impl SendMessage {
    pub fn new(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
            reply_to_message_id: None,
            disable_notification: None,
            disable_web_page_preview: None,
        }
    }

    pub fn parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = Some(parse_mode);
        self
    }

    /// Keyboard markup, passed through as built by the caller.
    pub fn reply_markup(mut self, markup: Value) -> Self {
        self.reply_markup = Some(markup);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn disable_notification(mut self, disable: bool) -> Self {
        self.disable_notification = Some(disable);
        self
    }

    pub fn disable_web_page_preview(mut self, disable: bool) -> Self {
        self.disable_web_page_preview = Some(disable);
        self
    }
}

/// Either `chat_id` + `message_id` or `inline_message_id` identifies the target.
#[derive(Debug, Clone, Serialize)]
pub struct EditMessageText {
    pub text: String,
    pub chat_id: Option<ChatId>,
    pub message_id: Option<i64>,
    pub inline_message_id: Option<String>,
    pub parse_mode: Option<ParseMode>,
    pub reply_markup: Option<Value>,
}

impl EditMessageText {
    pub fn new(chat_id: impl Into<ChatId>, message_id: i64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chat_id: Some(chat_id.into()),
            message_id: Some(message_id),
            inline_message_id: None,
            parse_mode: None,
            reply_markup: None,
        }
    }

    pub fn inline(inline_message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chat_id: None,
            message_id: None,
            inline_message_id: Some(inline_message_id.into()),
            parse_mode: None,
            reply_markup: None,
        }
    }

    pub fn parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = Some(parse_mode);
        self
    }

    pub fn reply_markup(mut self, markup: Value) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteMessage {
    pub chat_id: ChatId,
    pub message_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackQuery {
    pub callback_query_id: String,
    pub text: Option<String>,
    pub show_alert: Option<bool>,
    pub url: Option<String>,
    pub cache_time: Option<u32>,
}

impl AnswerCallbackQuery {
    pub fn new(callback_query_id: impl Into<String>) -> Self {
        Self {
            callback_query_id: callback_query_id.into(),
            text: None,
            show_alert: None,
            url: None,
            cache_time: None,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn show_alert(mut self, show_alert: bool) -> Self {
        self.show_alert = Some(show_alert);
        self
    }
}

/// `getUpdates` parameters. `offset` is the id of the first update to return.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetUpdates {
    pub offset: Option<i64>,
    pub limit: Option<u32>,
    pub timeout: Option<u32>,
    pub allowed_updates: Option<Vec<String>>,
}

/// `editMessageText` returns the edited message, or `true` for inline messages.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageOrTrue {
    Message(Box<Message>),
    True(bool),
}
