//! Per-user conversation state.
//!
//! Transient, process-lifetime only. The tracker only distinguishes "first
//! message after the greeting" from any later message; both paths converge
//! on ticket creation, so losing this map on restart is harmless.

use std::collections::HashMap;
use std::sync::Mutex;

/// Conversation state for a single user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    /// No conversation in progress
    #[default]
    Idle,
    /// Greeting sent, the next message is the first question
    AwaitingQuestion,
}

/// In-memory conversation state per user id.
///
/// The lock is internal and never held across an await point; callers read
/// the state once per incoming message, before any I/O.
#[derive(Default)]
pub struct ConversationTracker {
    states: Mutex<HashMap<i64, ConversationState>>,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user_id: i64, state: ConversationState) {
        self.states.lock().unwrap().insert(user_id, state);
    }

    /// Current state for a user, `Idle` when unknown.
    pub fn get(&self, user_id: i64) -> ConversationState {
        self.states
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn clear(&self, user_id: i64) {
        self.states.lock().unwrap().remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_is_idle() {
        let tracker = ConversationTracker::new();
        assert_eq!(tracker.get(42), ConversationState::Idle);
    }

    #[test]
    fn test_set_get_clear() {
        let tracker = ConversationTracker::new();

        tracker.set(42, ConversationState::AwaitingQuestion);
        assert_eq!(tracker.get(42), ConversationState::AwaitingQuestion);
        // Other users are unaffected
        assert_eq!(tracker.get(43), ConversationState::Idle);

        tracker.clear(42);
        assert_eq!(tracker.get(42), ConversationState::Idle);
    }
}
