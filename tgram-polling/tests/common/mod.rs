//! In-process stand-in for the Bot API used by poller tests.
//!
//! `getUpdates` honours `offset` (including negative offsets) and `limit` over a fixed list
//! of pending updates; optional injected fetch failures; can raise the stop flag the first
//! time a fetch finds nothing to return, which ends `Poller::run` after that iteration.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tgram_core::{strip_absent, Api, HandlerError, Params, Result, TgramError};
use tgram_polling::StopHandle;
use tgram_router::{handler_fn, Handler};

pub struct FakeTelegram {
    pending: Vec<Value>,
    fetches: Mutex<Vec<Params>>,
    calls: Mutex<Vec<(String, Params)>>,
    fetch_failures: AtomicU32,
    stop_when_idle: Mutex<Option<StopHandle>>,
}

impl FakeTelegram {
    pub fn new(pending: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            pending,
            fetches: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fetch_failures: AtomicU32::new(0),
            stop_when_idle: Mutex::new(None),
        })
    }

    /// The next `n` getUpdates calls fail with a transport error.
    pub fn fail_next_fetches(&self, n: u32) {
        self.fetch_failures.store(n, Ordering::SeqCst);
    }

    pub fn stop_when_idle(&self, stop: StopHandle) {
        *self.stop_when_idle.lock().unwrap() = Some(stop);
    }

    pub fn fetches(&self) -> Vec<Params> {
        self.fetches.lock().unwrap().clone()
    }

    /// `offset` of every getUpdates call, in order.
    pub fn fetch_offsets(&self) -> Vec<Option<i64>> {
        self.fetches()
            .iter()
            .map(|p| p.get("offset").and_then(Value::as_i64))
            .collect()
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().unwrap().clone()
    }

    fn select(&self, params: &Params) -> Vec<Value> {
        let offset = params.get("offset").and_then(Value::as_i64);
        let mut selected: Vec<Value> = match offset {
            Some(o) if o < 0 => {
                let keep = o.unsigned_abs() as usize;
                let skip = self.pending.len().saturating_sub(keep);
                self.pending[skip..].to_vec()
            }
            Some(o) => self
                .pending
                .iter()
                .filter(|u| u["update_id"].as_i64().unwrap_or(0) >= o)
                .cloned()
                .collect(),
            None => self.pending.clone(),
        };
        if let Some(limit) = params.get("limit").and_then(Value::as_u64) {
            selected.truncate(limit as usize);
        }
        selected
    }
}

#[async_trait]
impl Api for FakeTelegram {
    async fn call(&self, method: &str, params: Params) -> Result<Value> {
        let params = strip_absent(params);
        if method != "getUpdates" {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params.clone()));
            return Ok(match method {
                "sendMessage" => json!({
                    "message_id": 1000,
                    "date": 0,
                    "chat": {"id": params["chat_id"].clone(), "type": "private"},
                    "text": params["text"].clone()
                }),
                _ => json!(true),
            });
        }

        self.fetches.lock().unwrap().push(params.clone());
        if self
            .fetch_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(TgramError::Transport("connection reset by peer".to_string()));
        }

        let selected = self.select(&params);
        if selected.is_empty() {
            if let Some(stop) = self.stop_when_idle.lock().unwrap().as_ref() {
                stop.stop();
            }
        }
        Ok(Value::Array(selected))
    }
}

pub fn message_json(update_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id * 10,
            "date": 1_700_000_000,
            "chat": {"id": 555, "type": "private"},
            "from": {"id": 77, "is_bot": false, "first_name": "Alice"},
            "text": text
        }
    })
}

pub fn callback_json(update_id: i64, data: &str) -> Value {
    json!({
        "update_id": update_id,
        "callback_query": {
            "id": format!("cb-{}", update_id),
            "chat_instance": "ci",
            "from": {"id": 88, "first_name": "Bob"},
            "data": data
        }
    })
}

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Appends `label:<update_id>`.
pub fn recorder(journal: &Journal, label: &'static str) -> Arc<dyn Handler> {
    let journal = journal.clone();
    handler_fn(move |event| {
        let journal = journal.clone();
        async move {
            journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", label, event.update_id()));
            Ok(())
        }
    })
}

/// Records `label:<update_id>` and fails for its first `failures` invocations.
pub fn flaky(journal: &Journal, label: &'static str, failures: u32) -> Arc<dyn Handler> {
    let journal = journal.clone();
    let remaining = Arc::new(AtomicU32::new(failures));
    handler_fn(move |event| {
        let journal = journal.clone();
        let remaining = remaining.clone();
        async move {
            journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", label, event.update_id()));
            if remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(TgramError::Handler(HandlerError::Failed(label.to_string())));
            }
            Ok(())
        }
    })
}
