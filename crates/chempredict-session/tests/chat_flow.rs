//! End-to-end chat scenarios against a scripted backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chempredict_client::{ChatReply, TransportError};
use chempredict_core::config::ChatConfig;
use chempredict_core::types::ChatRole;
use chempredict_session::{ChatSessionManager, ClearOutcome, ErrorKind, SendOutcome};

use common::{connection_refused, Gate, ScriptedService};

fn manager(service: &Arc<ScriptedService>) -> ChatSessionManager {
    ChatSessionManager::new(service.clone(), &ChatConfig::default())
}

#[tokio::test]
async fn test_successful_exchange() {
    let service = Arc::new(ScriptedService::new());
    service.push_chat(Ok(ChatReply {
        sources: vec!["Clayden, Organic Chemistry".to_string()],
        ..ChatReply::text("An SN2 reaction proceeds with inversion of configuration.")
    }));
    let chat = manager(&service);

    let outcome = chat.send_message("  What is an SN2 reaction?  ").await;

    assert!(matches!(outcome, SendOutcome::Replied(_)));
    let transcript = chat.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, ChatRole::User);
    assert_eq!(transcript[0].content, "What is an SN2 reaction?");
    assert_eq!(transcript[1].role, ChatRole::Assistant);
    assert_eq!(
        transcript[1].content,
        "An SN2 reaction proceeds with inversion of configuration."
    );
    assert_eq!(transcript[1].sources.len(), 1);
    assert!(!chat.is_awaiting_reply());

    let sent = service.chat_calls.lock().unwrap()[0].clone();
    assert_eq!(sent.message, "What is an SN2 reaction?");
    assert_eq!(sent.session_id, chat.session_id());
}

#[tokio::test]
async fn test_connectivity_failure_becomes_assistant_turn() {
    let service = Arc::new(ScriptedService::new());
    service.push_chat(Err(connection_refused()));
    let chat = manager(&service);

    let outcome = chat.send_message("Hello?").await;

    match outcome {
        SendOutcome::Failed { turn, error } => {
            assert_eq!(error.kind(), ErrorKind::Connectivity);
            assert_eq!(turn.role, ChatRole::Assistant);
        }
        other => panic!("expected failure turn, got {:?}", other),
    }
    let transcript = chat.transcript();
    assert_eq!(transcript.len(), 2);
    let assistant: Vec<_> = transcript
        .iter()
        .filter(|t| t.role == ChatRole::Assistant)
        .collect();
    assert_eq!(assistant.len(), 1);
    assert!(assistant[0].content.contains("Cannot connect"));
    assert!(!chat.is_awaiting_reply());
}

#[tokio::test]
async fn test_service_unavailable_has_specific_message() {
    let service = Arc::new(ScriptedService::new());
    service.push_chat(Err(TransportError::Status {
        status: 503,
        body: r#"{"detail":"Chatbot service not available"}"#.to_string(),
    }));
    let chat = manager(&service);

    chat.send_message("Explain chirality").await;

    let last = chat.transcript().pop().unwrap();
    assert_eq!(last.role, ChatRole::Assistant);
    assert!(last.content.contains("temporarily unavailable"));
    assert!(last.content.contains("GOOGLE_API_KEY"));
}

#[tokio::test]
async fn test_generic_server_error_message() {
    let service = Arc::new(ScriptedService::new());
    service.push_chat(Err(TransportError::Status {
        status: 500,
        body: "Error processing chat request".to_string(),
    }));
    let chat = manager(&service);

    chat.send_message("Explain chirality").await;

    let last = chat.transcript().pop().unwrap();
    assert!(last.content.contains("having trouble connecting"));
}

#[tokio::test]
async fn test_blank_message_is_noop() {
    let service = Arc::new(ScriptedService::new());
    let chat = manager(&service);

    assert_eq!(chat.send_message("").await, SendOutcome::Ignored);
    assert_eq!(chat.send_message(" \n\t ").await, SendOutcome::Ignored);
    assert!(chat.transcript().is_empty());
    assert_eq!(service.chat_count(), 0);
}

#[tokio::test]
async fn test_overlong_message_is_noop() {
    let service = Arc::new(ScriptedService::new());
    let config = ChatConfig {
        max_message_length: 10,
        ..ChatConfig::default()
    };
    let chat = ChatSessionManager::new(service.clone(), &config);

    assert_eq!(chat.send_message("0123456789A").await, SendOutcome::Ignored);
    assert!(matches!(
        chat.send_message("0123456789").await,
        SendOutcome::Replied(_)
    ));
    assert_eq!(service.chat_count(), 1);
}

#[tokio::test]
async fn test_second_send_while_awaiting_is_noop() {
    let gate = Arc::new(Gate::default());
    let service = Arc::new(ScriptedService::gated(gate.clone()));
    let chat = Arc::new(manager(&service));

    let first = tokio::spawn({
        let chat = Arc::clone(&chat);
        async move { chat.send_message("first question").await }
    });
    gate.wait_entered().await;
    assert!(chat.is_awaiting_reply());
    assert_eq!(chat.transcript().len(), 1);

    assert_eq!(
        chat.send_message("second question").await,
        SendOutcome::Ignored
    );
    assert_eq!(chat.transcript().len(), 1);
    assert_eq!(service.chat_count(), 1);

    gate.open();
    assert!(matches!(first.await.unwrap(), SendOutcome::Replied(_)));
    let transcript = chat.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].content, "first question");
    assert_eq!(transcript[1].role, ChatRole::Assistant);
    assert!(!chat.is_awaiting_reply());
}

#[tokio::test]
async fn test_transcript_order_matches_calls() {
    let service = Arc::new(ScriptedService::new());
    service.push_chat(Ok(ChatReply::text("answer 1")));
    service.push_chat(Err(connection_refused()));
    service.push_chat(Ok(ChatReply::text("answer 3")));
    let chat = manager(&service);

    chat.send_message("q1").await;
    chat.send_message("q2").await;
    chat.send_message("q3").await;

    let roles_and_text: Vec<(ChatRole, String)> = chat
        .transcript()
        .into_iter()
        .map(|t| (t.role, t.content))
        .collect();
    assert_eq!(roles_and_text.len(), 6);
    assert_eq!(roles_and_text[0], (ChatRole::User, "q1".to_string()));
    assert_eq!(roles_and_text[1], (ChatRole::Assistant, "answer 1".to_string()));
    assert_eq!(roles_and_text[2], (ChatRole::User, "q2".to_string()));
    assert_eq!(roles_and_text[3].0, ChatRole::Assistant);
    assert_eq!(roles_and_text[4], (ChatRole::User, "q3".to_string()));
    assert_eq!(roles_and_text[5], (ChatRole::Assistant, "answer 3".to_string()));
}

#[tokio::test]
async fn test_session_id_is_stable() {
    let service = Arc::new(ScriptedService::new());
    let chat = manager(&service);
    assert!(chat.session_id().starts_with("user-session-"));
    assert_eq!(chat.session_id().len(), "user-session-".len() + 8);

    chat.send_message("one").await;
    chat.send_message("two").await;

    let calls = service.chat_calls.lock().unwrap().clone();
    assert_eq!(calls[0].session_id, calls[1].session_id);
    assert_eq!(calls[0].session_id, chat.session_id());

    let other = manager(&service);
    assert_ne!(other.session_id(), chat.session_id());
}

#[tokio::test]
async fn test_detach_discards_pending_reply() {
    let gate = Arc::new(Gate::default());
    let service = Arc::new(ScriptedService::gated(gate.clone()));
    let chat = Arc::new(manager(&service));

    let pending = tokio::spawn({
        let chat = Arc::clone(&chat);
        async move { chat.send_message("slow question").await }
    });
    gate.wait_entered().await;

    chat.detach();
    assert!(!chat.is_awaiting_reply());

    gate.open();
    assert_eq!(pending.await.unwrap(), SendOutcome::Discarded);
    let transcript = chat.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role, ChatRole::User);
}

#[tokio::test]
async fn test_clear_empties_transcript_on_success() {
    let service = Arc::new(ScriptedService::new());
    let chat = manager(&service);
    chat.send_message("hello").await;
    assert_eq!(chat.transcript().len(), 2);

    assert_eq!(chat.clear().await, ClearOutcome::Cleared);
    assert!(chat.transcript().is_empty());
    assert_eq!(
        service.clear_calls.lock().unwrap().as_slice(),
        &[chat.session_id().to_string()]
    );
}

#[tokio::test]
async fn test_clear_failure_keeps_transcript() {
    let service = Arc::new(ScriptedService::new());
    service.push_clear(Err(TransportError::Status {
        status: 503,
        body: "Chatbot service not available".to_string(),
    }));
    let chat = manager(&service);
    chat.send_message("hello").await;

    match chat.clear().await {
        ClearOutcome::Failed(err) => assert_eq!(err.kind(), ErrorKind::ServiceUnavailable),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(chat.transcript().len(), 2);
    assert!(!chat.is_awaiting_reply());
}

#[tokio::test]
async fn test_clear_while_awaiting_is_ignored() {
    let gate = Arc::new(Gate::default());
    let service = Arc::new(ScriptedService::gated(gate.clone()));
    let chat = Arc::new(manager(&service));

    let pending = tokio::spawn({
        let chat = Arc::clone(&chat);
        async move { chat.send_message("question").await }
    });
    gate.wait_entered().await;

    assert_eq!(chat.clear().await, ClearOutcome::Ignored);

    gate.open();
    pending.await.unwrap();
    assert_eq!(chat.transcript().len(), 2);
    assert!(service.clear_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dropped_send_releases_pending_reply() {
    let gate = Arc::new(Gate::default());
    let service = Arc::new(ScriptedService::gated(gate.clone()));
    let chat = manager(&service);

    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), chat.send_message("slow question")).await;

    assert!(timed_out.is_err());
    assert!(!chat.is_awaiting_reply());
    assert_eq!(chat.transcript().len(), 1);

    gate.open();
    assert!(matches!(
        chat.send_message("next question").await,
        SendOutcome::Replied(_)
    ));
    assert_eq!(chat.transcript().len(), 3);
}

#[tokio::test]
async fn test_pending_clear_is_not_a_reply_wait() {
    let gate = Arc::new(Gate::default());
    let service = Arc::new(ScriptedService::gated(gate.clone()));
    let chat = Arc::new(manager(&service));

    let pending = tokio::spawn({
        let chat = Arc::clone(&chat);
        async move { chat.clear().await }
    });
    gate.wait_entered().await;

    assert!(chat.is_clearing());
    assert!(!chat.is_awaiting_reply());
    assert_eq!(chat.send_message("hello").await, SendOutcome::Ignored);
    assert_eq!(chat.clear().await, ClearOutcome::Ignored);
    assert_eq!(service.chat_count(), 0);

    gate.open();
    assert_eq!(pending.await.unwrap(), ClearOutcome::Cleared);
    assert!(!chat.is_clearing());
}

#[tokio::test]
async fn test_dropped_clear_releases_session() {
    let gate = Arc::new(Gate::default());
    let service = Arc::new(ScriptedService::gated(gate.clone()));
    let chat = manager(&service);

    let timed_out = tokio::time::timeout(Duration::from_millis(50), chat.clear()).await;

    assert!(timed_out.is_err());
    assert!(!chat.is_clearing());
    gate.open();
    assert!(matches!(
        chat.send_message("still here?").await,
        SendOutcome::Replied(_)
    ));
}
