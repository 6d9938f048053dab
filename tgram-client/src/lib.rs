//! # tgram-client
//!
//! Request executor for the Telegram Bot API. [`ApiClient`] implements [`tgram_core::Api`]:
//! one logical call is a JSON POST to `<api-root>/<method>`, absent parameters are stripped,
//! and transport failures, non-success statuses and `ok=false` envelopes are retried
//! according to [`RetryPolicy`].

mod client;
mod config;
mod retry;

pub use client::{mask_token, ApiClient};
pub use config::{TelegramConfig, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use retry::RetryPolicy;
