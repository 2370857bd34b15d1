//! User-facing reply texts.
//!
//! Every job posts [`PROGRESS_NOTICE`] first, then exactly one of the terminal texts below.

/// Posted as soon as a mention is picked up, before the backend is contacted.
pub const PROGRESS_NOTICE: &str = "Analyzing your question with Genie... :brain:";

/// Posted when the attempt budget runs out while the backend is still working.
pub const TIMEOUT_NOTICE: &str = ":warning: The Genie query took too long to respond.";

/// Posted when the backend reports success, but sends no answer text.
pub const EMPTY_ANSWER_NOTICE: &str = ":grey_question: Genie finished, but did not return an answer.";

/// Used when a `FAILED` status carries no `error_details`.
pub const UNKNOWN_ERROR_DETAIL: &str = "Unknown error.";

/// Formats the reply for a backend-reported failure.
pub fn failure_reply(detail: &str) -> String {
    format!(":x: An error occurred while querying Genie: {detail}")
}

/// Formats the reply for any fault inside the job itself.
pub fn internal_error_reply(err: &impl std::fmt::Display) -> String {
    format!(":x: Sorry, I ran into an internal error: {err}")
}
