//! End-to-end relay flows over a fake transport and a temporary store.
//!
//! Covers the ticket lifecycle: intake (notify + acknowledge), reply
//! routing by id, the single-answer guarantee, and delivery-failure
//! recovery.

use std::sync::Arc;

use relay_common::store::TicketStore;
use relayd::poller::Relay;
use relayd::texts;
use relayd::transport::{FakeTransport, IncomingMessage, Markup};

const OPERATOR: i64 = 999;
const USER: i64 = 42;

async fn build_relay() -> (tempfile::TempDir, TicketStore, FakeTransport, Relay) {
    let dir = tempfile::tempdir().unwrap();
    let store = TicketStore::open(dir.path().join("tickets.db"))
        .await
        .unwrap();
    let transport = FakeTransport::new();
    let relay = Relay::new(store.clone(), Arc::new(transport.clone()), OPERATOR);
    (dir, store, transport, relay)
}

fn user_message(text: &str) -> IncomingMessage {
    IncomingMessage {
        sender_id: USER,
        sender_name: "Ada Lovelace".to_string(),
        text: text.to_string(),
    }
}

fn operator_message(text: &str) -> IncomingMessage {
    IncomingMessage {
        sender_id: OPERATOR,
        sender_name: "Operator".to_string(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_question_intake_end_to_end() {
    let (_dir, store, transport, relay) = build_relay().await;

    relay
        .dispatch(user_message("How do I reset my password?"))
        .await
        .unwrap();

    // Ticket persisted, unanswered
    let ticket = store.find_open(1).await.unwrap().unwrap();
    assert_eq!(ticket.user_id, USER);
    assert_eq!(ticket.question, "How do I reset my password?");
    assert!(!ticket.answered);

    // Operator notified with the id, the question, and a user reference
    let to_operator = transport.sent_to(OPERATOR);
    assert_eq!(to_operator.len(), 1);
    assert!(to_operator[0].text.contains("(ID: 1)"));
    assert!(to_operator[0].text.contains("How do I reset my password?"));
    assert!(to_operator[0].text.contains(&format!("tg://user?id={}", USER)));
    assert!(to_operator[0].text.contains("Ada Lovelace"));
    assert_eq!(to_operator[0].markup, Markup::Html);

    // User acknowledged
    let to_user = transport.sent_to(USER);
    assert_eq!(to_user.len(), 1);
    assert_eq!(to_user[0].text, texts::PROCESSING_ACK);
}

#[tokio::test]
async fn test_reply_routing_end_to_end() {
    let (_dir, store, transport, relay) = build_relay().await;

    relay
        .dispatch(user_message("How do I reset my password?"))
        .await
        .unwrap();
    relay
        .dispatch(operator_message("1. Use the reset link in settings."))
        .await
        .unwrap();

    // User received the reply text verbatim
    let to_user = transport.sent_to(USER);
    assert_eq!(to_user.last().unwrap().text, "Use the reset link in settings.");

    // Ticket closed
    assert!(store.find_open(1).await.unwrap().is_none());

    // Operator confirmed
    let to_operator = transport.sent_to(OPERATOR);
    assert_eq!(to_operator.last().unwrap().text, texts::REPLY_SENT);
}

#[tokio::test]
async fn test_reply_splits_on_first_separator_only() {
    let (_dir, _store, transport, relay) = build_relay().await;

    relay.dispatch(user_message("question")).await.unwrap();
    relay
        .dispatch(operator_message("1. Part one. Part two"))
        .await
        .unwrap();

    let to_user = transport.sent_to(USER);
    assert_eq!(to_user.last().unwrap().text, "Part one. Part two");
}

#[tokio::test]
async fn test_malformed_reply_changes_nothing() {
    let (_dir, store, transport, relay) = build_relay().await;

    relay.dispatch(user_message("question")).await.unwrap();
    relay
        .dispatch(operator_message("there is no separator"))
        .await
        .unwrap();

    let to_operator = transport.sent_to(OPERATOR);
    assert_eq!(to_operator.last().unwrap().text, texts::REPLY_USAGE);

    // The ticket is still open and the user saw nothing new
    assert!(store.find_open(1).await.unwrap().is_some());
    assert_eq!(transport.sent_to(USER).len(), 1);
}

#[tokio::test]
async fn test_unknown_and_non_numeric_ids() {
    let (_dir, _store, transport, relay) = build_relay().await;

    relay.dispatch(operator_message("7. hello")).await.unwrap();
    assert_eq!(
        transport.sent_to(OPERATOR).last().unwrap().text,
        texts::TICKET_NOT_FOUND
    );

    relay.dispatch(operator_message("abc. hello")).await.unwrap();
    assert_eq!(
        transport.sent_to(OPERATOR).last().unwrap().text,
        texts::TICKET_NOT_FOUND
    );
}

#[tokio::test]
async fn test_second_answer_is_rejected() {
    let (_dir, store, transport, relay) = build_relay().await;

    relay.dispatch(user_message("question")).await.unwrap();
    relay.dispatch(operator_message("1. first answer")).await.unwrap();
    relay
        .dispatch(operator_message("1. second answer"))
        .await
        .unwrap();

    assert_eq!(
        transport.sent_to(OPERATOR).last().unwrap().text,
        texts::TICKET_NOT_FOUND
    );

    // The user only ever saw the first answer (plus the intake ack)
    let to_user = transport.sent_to(USER);
    assert_eq!(to_user.last().unwrap().text, "first answer");
    assert!(store.find_open(1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delivery_failure_keeps_ticket_open() {
    let (_dir, store, transport, relay) = build_relay().await;

    relay.dispatch(user_message("question")).await.unwrap();

    transport.fail_for(USER);
    relay.dispatch(operator_message("1. answer")).await.unwrap();

    // Failure reported, ticket still open
    assert_eq!(
        transport.sent_to(OPERATOR).last().unwrap().text,
        texts::DELIVERY_FAILED
    );
    assert!(store.find_open(1).await.unwrap().is_some());

    // Retry succeeds once the user is reachable again
    transport.recover(USER);
    relay.dispatch(operator_message("1. answer")).await.unwrap();

    assert_eq!(transport.sent_to(USER).last().unwrap().text, "answer");
    assert!(store.find_open(1).await.unwrap().is_none());
    assert_eq!(
        transport.sent_to(OPERATOR).last().unwrap().text,
        texts::REPLY_SENT
    );
}

#[tokio::test]
async fn test_greeting_then_first_question() {
    let (_dir, store, transport, relay) = build_relay().await;

    relay.dispatch(user_message("/start")).await.unwrap();
    assert_eq!(transport.sent_to(USER).last().unwrap().text, texts::GREETING);
    // No ticket yet
    assert!(store.find_open(1).await.unwrap().is_none());

    relay.dispatch(user_message("first question")).await.unwrap();
    let ticket = store.find_open(1).await.unwrap().unwrap();
    assert_eq!(ticket.question, "first question");

    // The awaited state was consumed; the next message still files a
    // ticket, through the generic forwarding path
    relay.dispatch(user_message("second question")).await.unwrap();
    let ticket = store.find_open(2).await.unwrap().unwrap();
    assert_eq!(ticket.question, "second question");
}

#[tokio::test]
async fn test_operator_start_is_not_a_greeting() {
    let (_dir, _store, transport, relay) = build_relay().await;

    // Operator identity outranks the command match, so even /start from
    // the operator lands in the reply parser
    relay.dispatch(operator_message("/start")).await.unwrap();
    assert_eq!(
        transport.sent_to(OPERATOR).last().unwrap().text,
        texts::REPLY_USAGE
    );
}

#[tokio::test]
async fn test_ids_stay_unique_across_users() {
    let (_dir, store, transport, relay) = build_relay().await;

    for (i, user) in [100i64, 200, 300].iter().enumerate() {
        relay
            .dispatch(IncomingMessage {
                sender_id: *user,
                sender_name: format!("User {}", user),
                text: format!("question {}", i),
            })
            .await
            .unwrap();
    }

    // Each notification carries its own id, strictly increasing
    let notifications = transport.sent_to(OPERATOR);
    assert_eq!(notifications.len(), 3);
    for (i, sent) in notifications.iter().enumerate() {
        assert!(sent.text.contains(&format!("(ID: {})", i + 1)));
    }

    // And the right question is bound to the right user
    let ticket = store.find_open(2).await.unwrap().unwrap();
    assert_eq!(ticket.user_id, 200);
    assert_eq!(ticket.question, "question 1");
}
