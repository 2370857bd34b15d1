//! The job bridge: one background job per mention, from progress notice to terminal reply.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::{sync::Semaphore, task::JoinHandle};
use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{
        error::BridgeError,
        messages::{EMPTY_ANSWER_NOTICE, PROGRESS_NOTICE, TIMEOUT_NOTICE, failure_reply, internal_error_reply},
        types::{InboundEvent, JobOutcome, Res},
    },
    service::genie::{GenieClient, poll::PollPolicy},
};

use super::{question::normalize_question, reply::ThreadReply};

/// Runs mention jobs against Genie.
///
/// Cloning is cheap; all clones share the same concurrency limit.
#[derive(Clone)]
pub struct JobBridge {
    genie: GenieClient,
    policy: PollPolicy,
    permits: Arc<Semaphore>,
}

impl JobBridge {
    pub fn new(genie: GenieClient, policy: PollPolicy, max_concurrent_jobs: usize) -> Self {
        Self {
            genie,
            policy,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    /// Starts a job for `event` in the background and returns immediately.
    ///
    /// The returned handle belongs to a supervisor that logs the job if it dies
    /// abnormally (a panic outside the answer, or a cancellation), so dropping it is fine.
    pub fn spawn(&self, event: InboundEvent, reply: ThreadReply) -> JoinHandle<()> {
        let bridge = self.clone();
        let job = tokio::spawn(async move { bridge.run(event, reply).await }.in_current_span());

        tokio::spawn(
            async move {
                if let Err(err) = job.await {
                    error!("Mention job ended abnormally: {err}");
                }
            }
            .in_current_span(),
        )
    }

    /// Runs a job to completion.
    ///
    /// Posts the progress notice, then exactly one terminal reply, both into the
    /// event's thread. Never fails: every error ends up in the terminal reply.
    #[instrument(name = "JobBridge::run", skip_all, fields(channel_id = %event.channel, thread_ts = %event.thread_ts))]
    pub async fn run(&self, event: InboundEvent, reply: ThreadReply) {
        let question = normalize_question(&event.text);

        info!("Question received for Genie: '{question}'");

        reply.say(PROGRESS_NOTICE, &event.thread_ts).await;

        let result = AssertUnwindSafe(self.answer(question))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(anyhow::anyhow!("job panicked: {}", panic_message(panic.as_ref()))));

        reply.say(&terminal_text(result), &event.thread_ts).await;
    }

    /// Asks Genie `question` and waits for the answer.
    ///
    /// A backend-reported failure and an exhausted attempt budget come back as
    /// [`BridgeError::BackendReportedFailure`] and [`BridgeError::PollTimeout`].
    pub async fn answer(&self, question: &str) -> Res<String> {
        let _permit = self.permits.acquire().await?;

        let handle = self.genie.start_conversation(question).await?;

        info!("Started Genie conversation `{}` (message `{}`)", handle.conversation_id, handle.message_id);

        match self.genie.poll_until_settled(&handle, &self.policy).await? {
            JobOutcome::Succeeded(text) => Ok(text.filter(|t| !t.is_empty()).unwrap_or_else(|| EMPTY_ANSWER_NOTICE.to_string())),
            JobOutcome::Failed(detail) => Err(BridgeError::BackendReportedFailure(detail).into()),
            JobOutcome::TimedOut => Err(BridgeError::PollTimeout { attempts: self.policy.max_attempts }.into()),
        }
    }
}

/// Maps a job's result to the text of its terminal reply.
pub fn terminal_text(result: Res<String>) -> String {
    let err = match result {
        Ok(answer) => return answer,
        Err(err) => err,
    };

    match err.downcast_ref::<BridgeError>() {
        Some(BridgeError::BackendReportedFailure(detail)) => {
            warn!("Genie reported a failure: {detail}");
            failure_reply(detail)
        }
        Some(BridgeError::PollTimeout { .. }) => {
            warn!("{err}");
            TIMEOUT_NOTICE.to_string()
        }
        _ => {
            error!("Error while handling: {err}");
            internal_error_reply(&err)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
