//! Operator reply parsing and dispatch.
//!
//! Operator messages follow the grammar `<ticket_id>. <reply text>`. Only
//! the first ". " separates the id from the body, so the reply may contain
//! further punctuation untouched.

use anyhow::Result;
use relay_common::store::TicketStore;
use tracing::{info, warn};

use crate::texts;
use crate::transport::{ChatTransport, Markup};

/// Outcome of one operator reply attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Reply delivered to the user and the ticket marked answered
    Delivered,
    /// No 'ID. text' separator in the message
    Malformed,
    /// Id invalid, unknown, or the ticket was already answered
    NotFound,
    /// User unreachable; the ticket stays open for a retry
    DeliveryFailed,
}

/// Split `<id>. <reply>` on the first period-space separator. Returns
/// None when the separator is missing.
pub fn split_reply(text: &str) -> Option<(&str, &str)> {
    text.split_once(". ")
}

/// Parse the id part of a reply. An unparseable id is handled like a
/// store miss, which matches what a lookup with that key would find.
pub fn parse_ticket_id(raw: &str) -> Option<i64> {
    let id: i64 = raw.trim().parse().ok()?;
    (id > 0).then_some(id)
}

/// Parse an operator message, look up the open ticket, deliver the reply,
/// and close the ticket. The answered flag only flips after confirmed
/// delivery; a failed send leaves the ticket open and tells the operator.
pub async fn handle_operator_reply(
    store: &TicketStore,
    transport: &dyn ChatTransport,
    operator_id: i64,
    text: &str,
) -> Result<ReplyOutcome> {
    let Some((id_part, reply)) = split_reply(text) else {
        send_to_operator(transport, operator_id, texts::REPLY_USAGE).await;
        return Ok(ReplyOutcome::Malformed);
    };

    let Some(ticket_id) = parse_ticket_id(id_part) else {
        send_to_operator(transport, operator_id, texts::TICKET_NOT_FOUND).await;
        return Ok(ReplyOutcome::NotFound);
    };

    let Some(ticket) = store.find_open(ticket_id).await? else {
        send_to_operator(transport, operator_id, texts::TICKET_NOT_FOUND).await;
        return Ok(ReplyOutcome::NotFound);
    };

    if let Err(e) = transport.send(ticket.user_id, reply, Markup::Plain).await {
        warn!("Reply delivery for ticket {} failed: {}", ticket_id, e);
        send_to_operator(transport, operator_id, texts::DELIVERY_FAILED).await;
        return Ok(ReplyOutcome::DeliveryFailed);
    }

    if store.mark_answered(ticket_id).await? {
        info!("Ticket {} answered", ticket_id);
    } else {
        // Lost a race against a concurrent reply for the same id: the user
        // got this text, but the ticket was already closed under us
        warn!("Ticket {} was already answered when closing", ticket_id);
    }

    send_to_operator(transport, operator_id, texts::REPLY_SENT).await;
    Ok(ReplyOutcome::Delivered)
}

async fn send_to_operator(transport: &dyn ChatTransport, operator_id: i64, text: &str) {
    if let Err(e) = transport.send(operator_id, text, Markup::Plain).await {
        warn!("Failed to message operator: {}", e);
    }
}
