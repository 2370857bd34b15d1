pub mod databricks;
pub mod poll;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::base::{
    error::BridgeError,
    messages::UNKNOWN_ERROR_DETAIL,
    types::{ConversationHandle, MessageStatus, Res},
};

// Traits.

/// Generic question-answering backend trait that clients must implement.
///
/// The backend works asynchronously: a question is submitted once, and its
/// progress is then observed by repeatedly asking for the message status.
#[async_trait]
pub trait GenericGenieClient: Send + Sync + 'static {
    /// Start a new conversation with `question` as its only message.
    ///
    /// Fails with [`BridgeError::BackendUnavailable`] on a transport or status
    /// error, and with [`BridgeError::MalformedStartResponse`] when the
    /// response lacks either identifier.
    async fn start_conversation(&self, question: &str) -> Res<ConversationHandle>;

    /// Check on the message identified by `handle` once.
    ///
    /// Fails with [`BridgeError::BackendUnavailable`] on a transport or status error.
    async fn get_message_status(&self, handle: &ConversationHandle) -> Res<MessageStatus>;
}

// Structs.

/// Genie client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct GenieClient {
    inner: Arc<dyn GenericGenieClient>,
}

impl Deref for GenieClient {
    type Target = dyn GenericGenieClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl GenieClient {
    pub fn new(inner: Arc<dyn GenericGenieClient>) -> Self {
        Self { inner }
    }
}

// Helpers.

/// Reads `key` from `value` when it is present and a string.
fn str_field<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a str> {
    value.and_then(|v| v.get(key)).and_then(Value::as_str)
}

/// Pulls the conversation handle out of a start-conversation response body.
pub fn parse_start_response(body: Value) -> Res<ConversationHandle> {
    let id = |key: &'static str| {
        str_field(Some(&body), key)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or(BridgeError::MalformedStartResponse(key))
    };

    Ok(ConversationHandle {
        conversation_id: id("conversation_id")?,
        message_id: id("message_id")?,
    })
}

/// Interprets a message status response body.
///
/// The status is read on its own, so a finished message stays finished whatever
/// shape its `content` has. Anything other than `SUCCEEDED` or `FAILED`, including
/// a missing status, counts as still pending.
pub fn parse_message_status(body: Value) -> MessageStatus {
    let content = body.get("content");

    match str_field(Some(&body), "status") {
        Some("SUCCEEDED") => MessageStatus::Succeeded(str_field(content, "text").map(str::to_string)),
        Some("FAILED") => MessageStatus::Failed(str_field(content, "error_details").unwrap_or(UNKNOWN_ERROR_DETAIL).to_string()),
        _ => MessageStatus::Pending,
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_start_response() {
        let handle = parse_start_response(json!({ "conversation_id": "c-1", "message_id": "m-1", "extra": true })).unwrap();

        assert_eq!(handle.conversation_id, "c-1");
        assert_eq!(handle.message_id, "m-1");
    }

    #[test]
    fn test_parse_start_response_missing_ids() {
        for body in [json!({ "message_id": "m-1" }), json!({ "conversation_id": "c-1", "message_id": "" }), json!({ "conversation_id": 7, "message_id": "m-1" }), json!([1, 2, 3])] {
            let err = parse_start_response(body).unwrap_err();
            assert!(matches!(err.downcast_ref::<BridgeError>(), Some(BridgeError::MalformedStartResponse(_))));
        }
    }

    #[test]
    fn test_parse_message_status_succeeded() {
        let status = parse_message_status(json!({ "status": "SUCCEEDED", "content": { "text": "Revenue was $4.2M." } }));

        assert_eq!(status, MessageStatus::Succeeded(Some("Revenue was $4.2M.".to_string())));
    }

    #[test]
    fn test_parse_message_status_failed() {
        let status = parse_message_status(json!({ "status": "FAILED", "content": { "error_details": "quota exceeded" } }));
        assert_eq!(status, MessageStatus::Failed("quota exceeded".to_string()));

        let status = parse_message_status(json!({ "status": "FAILED" }));
        assert_eq!(status, MessageStatus::Failed(UNKNOWN_ERROR_DETAIL.to_string()));
    }

    #[test]
    fn test_parse_message_status_with_unexpected_content() {
        let status = parse_message_status(json!({ "status": "SUCCEEDED", "content": "revenue last quarter?" }));
        assert_eq!(status, MessageStatus::Succeeded(None));

        let status = parse_message_status(json!({ "status": "SUCCEEDED", "content": { "text": 42 } }));
        assert_eq!(status, MessageStatus::Succeeded(None));

        let status = parse_message_status(json!({ "status": "FAILED", "content": null }));
        assert_eq!(status, MessageStatus::Failed(UNKNOWN_ERROR_DETAIL.to_string()));

        let status = parse_message_status(json!({ "status": "FAILED", "content": { "error_details": ["quota"] } }));
        assert_eq!(status, MessageStatus::Failed(UNKNOWN_ERROR_DETAIL.to_string()));
    }

    #[test]
    fn test_parse_message_status_pending() {
        for body in [json!({ "status": "EXECUTING_QUERY" }), json!({ "status": "SUBMITTED", "content": {} }), json!({}), json!("nonsense")] {
            assert_eq!(parse_message_status(body), MessageStatus::Pending);
        }
    }
}
