//! Relay dispatch and the long-poll event loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use relay_common::store::TicketStore;
use tracing::{debug, error, info};

use crate::intake;
use crate::operator;
use crate::router::{self, MessageClass};
use crate::state::ConversationTracker;
use crate::telegram::TelegramTransport;
use crate::transport::{ChatTransport, IncomingMessage};

/// Back-off after a failed poll before trying again
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// The relay wires explicit dependency handles together: a store handle,
/// a transport handle, the conversation tracker, and the operator
/// identity. There are no process-wide singletons.
pub struct Relay {
    store: TicketStore,
    tracker: ConversationTracker,
    transport: Arc<dyn ChatTransport>,
    operator_id: i64,
}

impl Relay {
    pub fn new(store: TicketStore, transport: Arc<dyn ChatTransport>, operator_id: i64) -> Self {
        Self {
            store,
            tracker: ConversationTracker::new(),
            transport,
            operator_id,
        }
    }

    /// Classify and dispatch one incoming message.
    pub async fn dispatch(&self, message: IncomingMessage) -> Result<()> {
        let state = self.tracker.get(message.sender_id);
        let class = router::classify_message(&message, self.operator_id, state);
        debug!("Message from {} classified as {}", message.sender_id, class);

        match class {
            MessageClass::OperatorReply => {
                operator::handle_operator_reply(
                    &self.store,
                    self.transport.as_ref(),
                    self.operator_id,
                    &message.text,
                )
                .await?;
            }
            MessageClass::StartCommand => {
                intake::handle_start(self.transport.as_ref(), &self.tracker, &message).await;
            }
            MessageClass::AwaitedQuestion | MessageClass::ForwardedQuestion => {
                intake::handle_question(
                    &self.store,
                    self.transport.as_ref(),
                    &self.tracker,
                    self.operator_id,
                    &message,
                )
                .await?;
            }
        }

        Ok(())
    }
}

/// Long-poll the transport and feed messages through the relay.
///
/// One logical stream: messages are dispatched sequentially, suspending
/// at store and transport calls. A failed handler is logged and the loop
/// continues; a failed poll backs off briefly before retrying.
pub async fn run(relay: &Relay, telegram: &TelegramTransport, poll_timeout_secs: u64) -> Result<()> {
    let mut offset = 0i64;
    info!("Relay polling for updates");

    loop {
        let updates = match telegram.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => updates,
            Err(e) if e.is_retryable() => {
                error!("Polling failed: {}", e);
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
            // A rejected credential will not fix itself; stop instead of
            // spinning on the same request
            Err(e) => return Err(e.into()),
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            // Only text messages participate in the ticket flow
            let Some(message) = update.message else { continue };
            let (Some(from), Some(text)) = (message.from, message.text) else {
                continue;
            };

            let incoming = IncomingMessage {
                sender_id: from.id,
                sender_name: from.full_name(),
                text,
            };

            if let Err(e) = relay.dispatch(incoming).await {
                error!("Handler failed: {:#}", e);
            }
        }
    }
}
