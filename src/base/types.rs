//! Common types and result handling.

use serde::{Deserialize, Serialize};

/// The application-wide error type.
pub type Err = anyhow::Error;
/// The application-wide result type.
pub type Res<T> = Result<T, Err>;
/// A result with no value.
pub type Void = Res<()>;

/// A single @-mention delivered by the chat platform.
///
/// Built by the intake side once per delivery, and read-only from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// The raw message text, including the leading mention markup.
    pub text: String,
    /// The channel the mention was posted in.
    pub channel: String,
    /// The thread timestamp that replies should be anchored to.
    pub thread_ts: String,
}

impl InboundEvent {
    /// Builds an event, anchoring replies to the parent thread when the mention was posted inside one.
    pub fn new(text: impl Into<String>, channel: impl Into<String>, ts: impl Into<String>, thread_ts: Option<String>) -> Self {
        Self {
            text: text.into(),
            channel: channel.into(),
            thread_ts: thread_ts.filter(|ts| !ts.is_empty()).unwrap_or_else(|| ts.into()),
        }
    }
}

/// The backend's identifiers for an in-flight question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHandle {
    /// The conversation created for the question.
    pub conversation_id: String,
    /// The question's message within that conversation.
    pub message_id: String,
}

/// The interpretation of a single status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStatus {
    /// Still running (or any status we do not recognize).
    Pending,
    /// Finished with an answer; the text may be absent.
    Succeeded(Option<String>),
    /// Finished with a backend-reported error detail.
    Failed(String),
}

/// The settled state of a job's poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The backend answered; the text may be absent.
    Succeeded(Option<String>),
    /// The backend gave up with the contained detail.
    Failed(String),
    /// The attempt budget ran out first.
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_mention_anchors_to_itself() {
        let event = InboundEvent::new("<@U1> hi", "C1", "1700000000.000100", None);

        assert_eq!(event.thread_ts, "1700000000.000100");
    }

    #[test]
    fn test_threaded_mention_anchors_to_parent() {
        let event = InboundEvent::new("<@U1> hi", "C1", "1700000000.000200", Some("1700000000.000100".to_string()));

        assert_eq!(event.thread_ts, "1700000000.000100");
    }
}
