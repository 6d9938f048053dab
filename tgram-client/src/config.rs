//! Connection config: token, API base URL, shared request timeout, log path.
//! Loaded from BOT_TOKEN, TELEGRAM_API_URL, TELEGRAM_REQUEST_TIMEOUT_SECS, LOG_FILE.

use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::client::mask_token;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Must exceed the long-poll timeout, otherwise idle `getUpdates` calls time out client-side.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 35;

#[derive(Clone)]
pub struct TelegramConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL; base URL without the `/bot<token>` suffix
    pub telegram_api_url: Option<String>,
    /// TELEGRAM_REQUEST_TIMEOUT_SECS
    pub request_timeout: Duration,
    /// LOG_FILE
    pub log_file: Option<String>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &mask_token(&self.bot_token))
            .field("telegram_api_url", &self.telegram_api_url)
            .field("request_timeout", &self.request_timeout)
            .field("log_file", &self.log_file)
            .finish()
    }
}

impl TelegramConfig {
    /// Reads the environment: BOT_TOKEN is required, the rest is optional.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?;
        let telegram_api_url = env::var("TELEGRAM_API_URL").ok().filter(|s| !s.is_empty());
        let request_timeout = match env::var("TELEGRAM_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                anyhow::anyhow!("TELEGRAM_REQUEST_TIMEOUT_SECS is not a number: {}", raw)
            })?),
            Err(_) => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };
        let log_file = env::var("LOG_FILE").ok();
        Ok(Self {
            bot_token,
            telegram_api_url,
            request_timeout,
            log_file,
        })
    }

    /// Loads `.env` (if present), reads the environment and validates.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Given token, defaults for everything else.
    pub fn with_token(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            telegram_api_url: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_file: None,
        }
    }

    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.telegram_api_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!("TELEGRAM_API_URL is set but not a valid URL: {}", url_str);
            }
        }
        if self.request_timeout.is_zero() {
            anyhow::bail!("TELEGRAM_REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    /// `<base-url>/bot<token>`; method names are appended to this.
    pub fn api_root(&self) -> String {
        let base = self
            .telegram_api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/');
        format!("{}/bot{}", base, self.bot_token)
    }
}
