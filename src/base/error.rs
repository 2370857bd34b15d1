//! Failure kinds a job can end with.

use thiserror::Error;

/// Errors raised by the backend client and the poll loop.
///
/// These travel inside `anyhow::Error`, so the job boundary can downcast them
/// when it needs to tell them apart from unexpected faults.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The backend could not be reached, or answered with a non-success status.
    #[error("backend unavailable during {operation}: {reason}")]
    BackendUnavailable {
        /// The backend call that failed.
        operation: &'static str,
        /// What went wrong, as reported by the transport.
        reason: String,
    },
    /// The start call succeeded, but did not carry the identifiers we need.
    #[error("malformed start response: missing `{0}`")]
    MalformedStartResponse(&'static str),
    /// The backend finished the question with an error of its own.
    #[error("backend reported failure: {0}")]
    BackendReportedFailure(String),
    /// The attempt budget ran out while the question was still pending.
    #[error("no answer after {attempts} status checks")]
    PollTimeout {
        /// The number of status checks made.
        attempts: u32,
    },
}

impl BridgeError {
    pub(crate) fn unavailable(operation: &'static str, reason: impl ToString) -> Self {
        Self::BackendUnavailable {
            operation,
            reason: reason.to_string(),
        }
    }
}
