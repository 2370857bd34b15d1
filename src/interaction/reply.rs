//! The reply capability handed to each job.

use tracing::{error, instrument};

use crate::service::chat::ChatClient;

/// Posts messages into threads of one channel.
///
/// Built by the intake side; a job never constructs one itself.
#[derive(Clone)]
pub struct ThreadReply {
    chat: ChatClient,
    channel_id: String,
}

impl ThreadReply {
    pub fn new(chat: ChatClient, channel_id: String) -> Self {
        Self { chat, channel_id }
    }

    /// Posts `text` into the thread anchored at `thread_ts`.
    ///
    /// A failed delivery is logged and dropped; there is nowhere left to report it.
    #[instrument(name = "ThreadReply::say", skip(self, text), fields(channel_id = %self.channel_id))]
    pub async fn say(&self, text: &str, thread_ts: &str) {
        if let Err(err) = self.chat.send_message(&self.channel_id, thread_ts, text).await {
            error!("Failed to deliver reply: {}", err);
        }
    }
}
