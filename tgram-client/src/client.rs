//! reqwest-backed implementation of [`tgram_core::Api`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tgram_core::{strip_absent, Api, Params, Result, TgramError};
use tracing::debug;

use crate::config::TelegramConfig;
use crate::retry::RetryPolicy;

/// Masks a bot token for logging: keeps the numeric bot id, hides the secret.
/// Tokens without the `<id>:<secret>` shape are fully masked as "***".
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => {
            format!("{}:***", id)
        }
        _ => "***".to_string(),
    }
}

/// `{ok, result}` on success, `{ok: false, description, error_code}` on failure.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

fn transport(e: reqwest::Error) -> TgramError {
    // The request URL carries the token.
    TgramError::Transport(e.without_url().to_string())
}

/// Request executor: one shared connection pool and timeout, retries per [`RetryPolicy`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_root: String,
    masked_token: String,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Client for the public Bot API with default timeout and retry policy.
    pub fn new(token: &str) -> Result<Self> {
        Self::from_config(&TelegramConfig::with_token(token))
    }

    pub fn from_config(config: &TelegramConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TgramError::Config(e.to_string()))?;
        Ok(Self {
            http,
            api_root: config.api_root(),
            masked_token: mask_token(&config.bot_token),
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// One HTTP attempt: POST, status check, envelope check.
    async fn attempt(&self, method: &str, params: &Params) -> Result<Value> {
        let url = format!("{}/{}", self.api_root, method);
        let response = self
            .http
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        if !status.is_success() {
            let description = serde_json::from_slice::<ApiResponse>(&body)
                .ok()
                .and_then(|r| r.description)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(TgramError::Status {
                status: status.as_u16(),
                description,
            });
        }

        let envelope: ApiResponse = serde_json::from_slice(&body)?;
        if !envelope.ok {
            return Err(TgramError::Api {
                description: envelope
                    .description
                    .unwrap_or_else(|| "Unknown error".to_string()),
                error_code: envelope.error_code,
            });
        }
        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Api for ApiClient {
    async fn call(&self, method: &str, params: Params) -> Result<Value> {
        let params = strip_absent(params);
        debug!(
            method = %method,
            bot = %self.masked_token,
            param_count = params.len(),
            "step: api call"
        );
        self.retry
            .run(method, |_| self.attempt(method, &params))
            .await
    }
}
