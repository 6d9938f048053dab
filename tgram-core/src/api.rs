//! Transport-agnostic Bot API access.
//!
//! [`Api`] issues one logical call and returns the envelope's `result`; the HTTP executor in
//! tgram-client implements it, tests substitute in-process mocks. [`ApiExt`] layers the typed
//! methods on top and is implemented for every [`Api`].

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::methods::{
    AnswerCallbackQuery, ChatId, DeleteMessage, EditMessageText, GetUpdates, MessageOrTrue,
    SendMessage,
};
use crate::types::{Message, Update, User};

/// Top-level JSON parameters of one call.
pub type Params = serde_json::Map<String, Value>;

/// Drops parameters whose value is absent (`null`). `false`, `0` and `""` are kept.
pub fn strip_absent(params: Params) -> Params {
    params.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

#[async_trait]
pub trait Api: Send + Sync {
    /// Calls `method` with `params` and returns the `result` payload.
    async fn call(&self, method: &str, params: Params) -> Result<Value>;
}

fn to_params<P: Serialize + ?Sized>(params: &P) -> Result<Params> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Params::new()),
        other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
            "parameters must serialize to a JSON object, got {}",
            other
        ))
        .into()),
    }
}

#[async_trait]
pub trait ApiExt: Api {
    /// Serializes `params`, calls `method` and decodes the result into `R`.
    async fn request<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned + Send,
    {
        let params = to_params(params)?;
        let result = self.call(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn get_updates(&self, request: &GetUpdates) -> Result<Vec<Update>> {
        self.request("getUpdates", request).await
    }

    async fn get_me(&self) -> Result<User> {
        self.request("getMe", &Params::new()).await
    }

    async fn send_message(&self, request: &SendMessage) -> Result<Message> {
        self.request("sendMessage", request).await
    }

    async fn edit_message_text(&self, request: &EditMessageText) -> Result<MessageOrTrue> {
        self.request("editMessageText", request).await
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: i64) -> Result<bool> {
        self.request(
            "deleteMessage",
            &DeleteMessage {
                chat_id,
                message_id,
            },
        )
        .await
    }

    async fn answer_callback_query(&self, request: &AnswerCallbackQuery) -> Result<bool> {
        self.request("answerCallbackQuery", request).await
    }
}

impl<T: Api + ?Sized> ApiExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records calls and answers every call with a fixed result.
    struct RecordingApi {
        calls: Mutex<Vec<(String, Params)>>,
        result: Value,
    }

    #[async_trait]
    impl Api for RecordingApi {
        async fn call(&self, method: &str, params: Params) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            Ok(self.result.clone())
        }
    }

    #[test]
    fn test_strip_absent_keeps_false_and_zero() {
        let params = to_params(&json!({
            "a": null, "b": false, "c": 0, "d": "", "e": {"nested": null}
        }))
        .unwrap();
        let stripped = strip_absent(params);
        assert!(!stripped.contains_key("a"));
        assert_eq!(stripped["b"], json!(false));
        assert_eq!(stripped["c"], json!(0));
        assert_eq!(stripped["d"], json!(""));
        assert_eq!(stripped["e"], json!({"nested": null}));
    }

    #[test]
    fn test_to_params_rejects_non_object() {
        assert!(to_params(&json!([1, 2])).is_err());
        assert!(to_params(&()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_typed_method_through_dyn_api() {
        let api: std::sync::Arc<dyn Api> = std::sync::Arc::new(RecordingApi {
            calls: Mutex::new(Vec::new()),
            result: json!(true),
        });
        let ok = api.delete_message(ChatId::Id(7), 99).await.unwrap();
        assert!(ok);

        let ok = api
            .answer_callback_query(&AnswerCallbackQuery::new("q1").text("done"))
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_decode_failure_is_decode_error() {
        let api = RecordingApi {
            calls: Mutex::new(Vec::new()),
            result: json!("not a user"),
        };
        let err = api.get_me().await.unwrap_err();
        assert!(matches!(err, crate::TgramError::Decode(_)));
        assert_eq!(api.calls.lock().unwrap()[0].0, "getMe");
    }
}
