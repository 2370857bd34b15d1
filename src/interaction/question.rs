//! Question text cleanup.

/// Strips the leading mention markup from a message.
///
/// Everything up to and including the first `>` is dropped, and the rest is trimmed.
/// Text without a `>` is only trimmed.
///
/// ```
/// use genie_bridge::interaction::question::normalize_question;
///
/// assert_eq!(normalize_question("<@U123> revenue last quarter?"), "revenue last quarter?");
/// ```
pub fn normalize_question(raw: &str) -> &str {
    match raw.split_once('>') {
        Some((_, rest)) => rest.trim(),
        None => raw.trim(),
    }
}
