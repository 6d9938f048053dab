//! # tgram-core
//!
//! Core types for the tgram update engine: decoded [`Update`] payloads, the [`TgramError`]
//! taxonomy, the transport-agnostic [`Api`] trait with typed Bot API methods ([`ApiExt`]),
//! and tracing initialization. Used by tgram-client, tgram-router and tgram-polling.

pub mod api;
pub mod error;
pub mod logger;
pub mod methods;
pub mod types;

pub use api::{strip_absent, Api, ApiExt, Params};
pub use error::{HandlerError, Result, TgramError};
pub use logger::{init_tracing, DEFAULT_LOG_LEVEL};
pub use methods::{
    AnswerCallbackQuery, ChatId, DeleteMessage, EditMessageText, GetUpdates, MessageOrTrue,
    ParseMode, SendMessage,
};
pub use types::{CallbackQuery, Chat, Message, Update, UpdateKind, User};
