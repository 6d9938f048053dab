//! Shared fixtures for router tests: update builders, a recording [`Api`] and handlers that
//! log their label into a shared journal.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tgram_core::{Api, HandlerError, Params, Result, TgramError, Update};
use tgram_router::{handler_fn, Handler};

/// Records every call and answers with `result`.
pub struct RecordingApi {
    pub calls: Mutex<Vec<(String, Params)>>,
    result: Value,
}

impl RecordingApi {
    pub fn new(result: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            result,
        })
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Api for RecordingApi {
    async fn call(&self, method: &str, params: Params) -> Result<Value> {
        self.calls.lock().unwrap().push((method.to_string(), params));
        Ok(self.result.clone())
    }
}

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Handler that appends `label:<subject>` to the journal.
pub fn recorder(journal: &Journal, label: &'static str) -> Arc<dyn Handler> {
    let journal = journal.clone();
    handler_fn(move |event| {
        let journal = journal.clone();
        async move {
            let subject = event
                .text()
                .or(event.callback_data())
                .unwrap_or("")
                .to_string();
            journal.lock().unwrap().push(format!("{}:{}", label, subject));
            Ok(())
        }
    })
}

/// Handler that records its label and then fails.
pub fn failing(journal: &Journal, label: &'static str) -> Arc<dyn Handler> {
    let journal = journal.clone();
    handler_fn(move |_event| {
        let journal = journal.clone();
        async move {
            journal.lock().unwrap().push(label.to_string());
            Err(TgramError::Handler(HandlerError::Failed(label.to_string())))
        }
    })
}

pub fn message_update(update_id: i64, text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": update_id,
        "message": {
            "message_id": 100 + update_id,
            "date": 1_700_000_000,
            "chat": {"id": 555, "type": "private"},
            "from": {"id": 77, "is_bot": false, "first_name": "Alice"},
            "text": text
        }
    }))
    .unwrap()
}

pub fn callback_update(update_id: i64, data: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": update_id,
        "callback_query": {
            "id": format!("cb-{}", update_id),
            "chat_instance": "ci",
            "from": {"id": 88, "is_bot": false, "first_name": "Bob"},
            "data": data,
            "message": {
                "message_id": 9,
                "date": 1_700_000_000,
                "chat": {"id": 666, "type": "group", "title": "Team"}
            }
        }
    }))
    .unwrap()
}
