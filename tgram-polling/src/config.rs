//! Polling loop config. Loaded from POLL_INTERVAL_MS, POLL_TIMEOUT_SECS, POLL_LIMIT,
//! DROP_PENDING_UPDATES, MAX_UPDATE_FAILURES; every value has a default.

use anyhow::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Update kinds requested by default; everything else is unroutable anyway.
pub const DEFAULT_ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Sleep after a failed iteration before fetching again
    pub interval: Duration,
    /// Long-poll timeout sent as `timeout`
    pub timeout_secs: u32,
    /// `limit`; `None` leaves it to the server
    pub limit: Option<u32>,
    /// Discard the backlog once before entering the loop
    pub drop_pending_updates: bool,
    pub allowed_updates: Vec<String>,
    /// Dead-letter an update after this many consecutive dispatch failures.
    /// `None` retries forever.
    pub max_update_failures: Option<u32>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout_secs: 30,
            limit: None,
            drop_pending_updates: false,
            allowed_updates: DEFAULT_ALLOWED_UPDATES.iter().map(|s| s.to_string()).collect(),
            max_update_failures: None,
        }
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", key, raw)),
        _ => Ok(None),
    }
}

impl PollingConfig {
    /// Reads the environment; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let interval = parse_var::<u64>("POLL_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);
        let timeout_secs = parse_var("POLL_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs);
        let limit = parse_var("POLL_LIMIT")?;
        let drop_pending_updates =
            parse_var("DROP_PENDING_UPDATES")?.unwrap_or(defaults.drop_pending_updates);
        let max_update_failures = parse_var("MAX_UPDATE_FAILURES")?;
        Ok(Self {
            interval,
            timeout_secs,
            limit,
            drop_pending_updates,
            allowed_updates: defaults.allowed_updates,
            max_update_failures,
        })
    }

    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn timeout_secs(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn drop_pending_updates(mut self, drop: bool) -> Self {
        self.drop_pending_updates = drop;
        self
    }

    #[must_use]
    pub fn max_update_failures(mut self, max: u32) -> Self {
        self.max_update_failures = Some(max.max(1));
        self
    }

    /// Checks the long-poll timeout against the HTTP client's request timeout.
    ///
    /// An idle `getUpdates` is held open for `timeout_secs`; the client must wait longer,
    /// otherwise every quiet poll ends in a client-side timeout and a retry.
    pub fn check_request_timeout(&self, request_timeout: Duration) -> Result<()> {
        let long_poll = Duration::from_secs(u64::from(self.timeout_secs));
        if long_poll >= request_timeout {
            anyhow::bail!(
                "POLL_TIMEOUT_SECS ({}s) must be below TELEGRAM_REQUEST_TIMEOUT_SECS ({}s)",
                long_poll.as_secs(),
                request_timeout.as_secs()
            );
        }
        Ok(())
    }
}
