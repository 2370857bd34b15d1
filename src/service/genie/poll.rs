//! Bounded polling of an in-flight Genie message.

use std::time::Duration;

use tracing::{info, instrument};

use crate::base::types::{ConversationHandle, JobOutcome, MessageStatus, Res};

use super::GenieClient;

/// How often, and how many times, a message is checked before giving up.
///
/// The total wait is bounded by the sum of [`PollPolicy::delay_after`] over all
/// but the last attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    pub backoff_factor: u32,
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(5),
            backoff_factor: 1,
            max_interval: Duration::from_secs(30),
        }
    }
}

impl PollPolicy {
    /// The wait following the pending check number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.max(1).saturating_pow(attempt.saturating_sub(1));

        self.interval.saturating_mul(factor).min(self.max_interval.max(self.interval))
    }
}

impl GenieClient {
    /// Polls `handle` until it settles or the attempt budget runs out.
    ///
    /// Only a pending status is retried. A failing status request ends the loop
    /// with its error.
    #[instrument(name = "GenieClient::poll_until_settled", skip_all, fields(conversation_id = %handle.conversation_id, message_id = %handle.message_id))]
    pub async fn poll_until_settled(&self, handle: &ConversationHandle, policy: &PollPolicy) -> Res<JobOutcome> {
        for attempt in 1..=policy.max_attempts {
            let status = self.get_message_status(handle).await?;

            info!("Genie message status after attempt {attempt}/{}: {status:?}", policy.max_attempts);

            match status {
                MessageStatus::Succeeded(text) => return Ok(JobOutcome::Succeeded(text)),
                MessageStatus::Failed(detail) => return Ok(JobOutcome::Failed(detail)),
                MessageStatus::Pending => {
                    if attempt < policy.max_attempts {
                        tokio::time::sleep(policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        Ok(JobOutcome::TimedOut)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use async_trait::async_trait;
    use mockall::mock;

    use super::*;
    use crate::{base::error::BridgeError, service::genie::GenericGenieClient};

    mock! {
        pub Genie {}

        #[async_trait]
        impl GenericGenieClient for Genie {
            async fn start_conversation(&self, question: &str) -> Res<ConversationHandle>;
            async fn get_message_status(&self, handle: &ConversationHandle) -> Res<MessageStatus>;
        }
    }

    fn handle() -> ConversationHandle {
        ConversationHandle {
            conversation_id: "c-1".to_string(),
            message_id: "m-1".to_string(),
        }
    }

    /// A client that stays pending until `settle_on`, then returns `settled`.
    fn genie_settling_on(settle_on: u32, settled: MessageStatus, calls: Arc<AtomicU32>) -> GenieClient {
        let mut mock = MockGenie::new();

        mock.expect_get_message_status().returning(move |_| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= settle_on { Ok(settled.clone()) } else { Ok(MessageStatus::Pending) }
        });

        GenieClient::new(Arc::new(mock))
    }

    #[test]
    fn test_fixed_delay_by_default() {
        let policy = PollPolicy::default();

        for attempt in 1..=10 {
            assert_eq!(policy.delay_after(attempt), Duration::from_secs(5));
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = PollPolicy {
            backoff_factor: 2,
            max_interval: Duration::from_secs(30),
            ..Default::default()
        };

        assert_eq!(policy.delay_after(1), Duration::from_secs(5));
        assert_eq!(policy.delay_after(2), Duration::from_secs(10));
        assert_eq!(policy.delay_after(3), Duration::from_secs(20));
        assert_eq!(policy.delay_after(4), Duration::from_secs(30));
        assert_eq!(policy.delay_after(40), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_kth_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let genie = genie_settling_on(4, MessageStatus::Succeeded(Some("42".to_string())), calls.clone());

        let outcome = genie.poll_until_settled(&handle(), &PollPolicy::default()).await.unwrap();

        assert_eq!(outcome, JobOutcome::Succeeded(Some("42".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let genie = genie_settling_on(1, MessageStatus::Failed("quota exceeded".to_string()), calls.clone());

        let outcome = genie.poll_until_settled(&handle(), &PollPolicy::default()).await.unwrap();

        assert_eq!(outcome, JobOutcome::Failed("quota exceeded".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let genie = genie_settling_on(u32::MAX, MessageStatus::Pending, calls.clone());
        let started = tokio::time::Instant::now();

        let outcome = genie.poll_until_settled(&handle(), &PollPolicy::default()).await.unwrap();

        assert_eq!(outcome, JobOutcome::TimedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        // No wait after the final attempt.
        assert_eq!(started.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_not_retried() {
        let mut mock = MockGenie::new();
        mock.expect_get_message_status()
            .times(1)
            .returning(|_| Err(BridgeError::unavailable("get_message_status", "503 Service Unavailable").into()));
        let genie = GenieClient::new(Arc::new(mock));

        let err = genie.poll_until_settled(&handle(), &PollPolicy::default()).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<BridgeError>(), Some(BridgeError::BackendUnavailable { .. })));
    }
}
