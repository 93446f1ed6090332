//! User- and operator-facing message copy.

/// Greeting sent on /start
pub const GREETING: &str = "Hi! This is the support bot. Describe your question \
or problem here and our team will help you.";

/// Acknowledgment sent to a user after their question is persisted
pub const PROCESSING_ACK: &str = "<b>Your question is being processed.</b>\n\
\u{2022} Please expect a reply within 24 hours.\n\
\u{2022} If you have not received an answer by then, please send your question again.";

/// Confirmation to the operator after a delivered reply
pub const REPLY_SENT: &str = "Reply delivered to the user.";

/// Unknown or already-answered ticket id
pub const TICKET_NOT_FOUND: &str = "Ticket not found or already answered.";

/// Malformed operator reply (missing the 'ID. text' separator)
pub const REPLY_USAGE: &str = "Please use the format 'ID. your reply text'.";

/// Delivery to the user failed; the ticket stays open for a retry
pub const DELIVERY_FAILED: &str =
    "Could not deliver the reply. The ticket is still open, please try again.";

/// Operator notification: who asked, a clickable reference to them, the
/// ticket id, and the verbatim question.
pub fn operator_notification(
    user_id: i64,
    display_name: &str,
    ticket_id: i64,
    question: &str,
) -> String {
    format!(
        "Message from user <a href=\"tg://user?id={}\">{}</a> (ID: {}):\n{}",
        user_id,
        escape_html(display_name),
        ticket_id,
        escape_html(question)
    )
}

/// Escape user-supplied text interpolated into HTML-mode messages, so a
/// question containing '<' cannot break the notification markup.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
