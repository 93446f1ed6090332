//! Transport abstraction over the chat platform.
//!
//! Handlers only need the outbound send primitive, so that is the whole
//! trait; receiving stays with the concrete poller. Production code uses
//! `TelegramTransport`; test code uses `FakeTransport` with
//! pre-configured failures.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use relay_common::error::RelayError;

/// Text markup accepted by the chat platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// Plain text, sent as-is
    Plain,
    /// Minimal rich text: bold and clickable user-reference links
    Html,
}

/// An incoming text message from the chat platform
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Chat id of the sender
    pub sender_id: i64,
    /// Human-readable name, used in operator notifications
    pub sender_name: String,
    /// Message text
    pub text: String,
}

/// Outbound send primitive of the chat platform.
///
/// Errors are recoverable; callers decide whether ticket state may
/// advance after a failed send.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, recipient: i64, text: &str, markup: Markup) -> Result<(), RelayError>;
}

/// A message recorded by `FakeTransport`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: i64,
    pub text: String,
    pub markup: Markup,
}

/// In-memory transport for tests.
///
/// Records every send and can be told to fail deliveries to specific
/// recipients, which is how delivery-failure paths are exercised without
/// a network.
#[derive(Default, Clone)]
pub struct FakeTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing: Arc<Mutex<HashSet<i64>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends to `recipient` fail until `recover` is called.
    pub fn fail_for(&self, recipient: i64) {
        self.failing.lock().unwrap().insert(recipient);
    }

    pub fn recover(&self, recipient: i64) {
        self.failing.lock().unwrap().remove(&recipient);
    }

    /// All messages sent so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages sent to one recipient, in order.
    pub fn sent_to(&self, recipient: i64) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.recipient == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send(&self, recipient: i64, text: &str, markup: Markup) -> Result<(), RelayError> {
        if self.failing.lock().unwrap().contains(&recipient) {
            return Err(RelayError::Transport(format!(
                "recipient {} unreachable",
                recipient
            )));
        }
        self.sent.lock().unwrap().push(SentMessage {
            recipient,
            text: text.to_string(),
            markup,
        });
        Ok(())
    }
}
