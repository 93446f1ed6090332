//! Ticket types for the support relay.
//!
//! A ticket is a persisted user question awaiting at most one operator
//! reply. Ids are assigned by the store and never reused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted support ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique id, monotonically assigned by the store on creation
    pub id: i64,
    /// Chat id of the requesting user; immutable after creation
    pub user_id: i64,
    /// Original question text; immutable
    pub question: String,
    /// Set true at most once, on confirmed delivery of the operator reply
    pub answered: bool,
    /// When the ticket was created
    pub created_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// A ticket is eligible for answering only while unanswered.
    pub fn is_open(&self) -> bool {
        !self.answered
    }
}
