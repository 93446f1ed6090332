//! Inbound message classification.
//!
//! Every incoming message is classified exactly once into a tagged class,
//! then matched exhaustively by the dispatcher. Precedence is fixed:
//! operator identity, then the start command, then per-user conversation
//! state, then generic forwarding. The operator is never treated as a
//! requester, whatever conversation state they happen to be in.

use serde::{Deserialize, Serialize};

use crate::state::ConversationState;
use crate::transport::IncomingMessage;

/// Start/greeting command
pub const START_COMMAND: &str = "/start";

/// Classification of one incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageClass {
    /// Sender is the configured operator: route to the reply parser
    OperatorReply,
    /// Start command from a user: greet and await the first question
    StartCommand,
    /// First question from a user in the awaiting state
    AwaitedQuestion,
    /// Any other user message: forwarded as a question
    ForwardedQuestion,
}

impl std::fmt::Display for MessageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OperatorReply => "operator_reply",
            Self::StartCommand => "start_command",
            Self::AwaitedQuestion => "awaited_question",
            Self::ForwardedQuestion => "forwarded_question",
        };
        write!(f, "{}", s)
    }
}

/// Classify an incoming message. First match wins.
pub fn classify_message(
    message: &IncomingMessage,
    operator_id: i64,
    state: ConversationState,
) -> MessageClass {
    if message.sender_id == operator_id {
        return MessageClass::OperatorReply;
    }

    if is_start_command(&message.text) {
        return MessageClass::StartCommand;
    }

    if state == ConversationState::AwaitingQuestion {
        return MessageClass::AwaitedQuestion;
    }

    MessageClass::ForwardedQuestion
}

/// Match "/start" and the addressed form "/start@botname".
fn is_start_command(text: &str) -> bool {
    match text.trim().split_whitespace().next() {
        Some(first) => {
            first == START_COMMAND
                || first
                    .strip_prefix(START_COMMAND)
                    .is_some_and(|rest| rest.starts_with('@'))
        }
        None => false,
    }
}
