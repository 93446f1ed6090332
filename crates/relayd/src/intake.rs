//! Ticket intake: turn a user message into a persisted ticket, notify the
//! operator, acknowledge the user.

use anyhow::Result;
use relay_common::store::TicketStore;
use tracing::{info, warn};

use crate::state::{ConversationState, ConversationTracker};
use crate::texts;
use crate::transport::{ChatTransport, IncomingMessage, Markup};

/// Handle the start command: greet the user and await their first question.
pub async fn handle_start(
    transport: &dyn ChatTransport,
    tracker: &ConversationTracker,
    message: &IncomingMessage,
) {
    if let Err(e) = transport
        .send(message.sender_id, texts::GREETING, Markup::Plain)
        .await
    {
        warn!("Failed to send greeting to {}: {}", message.sender_id, e);
    }
    tracker.set(message.sender_id, ConversationState::AwaitingQuestion);
}

/// Handle a user question, whether awaited after /start or forwarded
/// directly.
///
/// A failed insert aborts before either notification runs; a notification
/// referencing a ticket that does not exist would be worse than silence.
/// Notification failures after the insert are logged and never roll the
/// ticket back.
pub async fn handle_question(
    store: &TicketStore,
    transport: &dyn ChatTransport,
    tracker: &ConversationTracker,
    operator_id: i64,
    message: &IncomingMessage,
) -> Result<i64> {
    let ticket_id = store.create(message.sender_id, &message.text).await?;
    info!(
        "Ticket {} created for user {}",
        ticket_id, message.sender_id
    );

    let notification = texts::operator_notification(
        message.sender_id,
        &message.sender_name,
        ticket_id,
        &message.text,
    );
    if let Err(e) = transport.send(operator_id, &notification, Markup::Html).await {
        warn!(
            "Failed to notify operator about ticket {}: {}",
            ticket_id, e
        );
    }

    if let Err(e) = transport
        .send(message.sender_id, texts::PROCESSING_ACK, Markup::Html)
        .await
    {
        warn!("Failed to acknowledge user {}: {}", message.sender_id, e);
    }

    // The greeting-to-question transition is consumed either way
    tracker.clear(message.sender_id);

    Ok(ticket_id)
}
