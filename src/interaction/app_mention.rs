//! Intake for @-mentions of the bot.

use tracing::{info, instrument};

use crate::base::types::InboundEvent;

use super::{job::JobBridge, reply::ThreadReply};

/// Handles an app mention event.
///
/// Returns immediately; the question is answered by a job running in the background.
#[instrument(skip_all, fields(channel_id = %event.channel, thread_ts = %event.thread_ts))]
pub fn handle_app_mention(event: InboundEvent, reply: ThreadReply, bridge: JobBridge) {
    info!("Handing mention off to a new job ...");

    // The supervisor behind the handle logs an abnormal job exit.
    bridge.spawn(event, reply);
}
