//! Research chat session manager.
//!
//! Keeps one append-only transcript per session. Every user message gets an
//! immediate local echo and, once the backend answers or fails, exactly one
//! assistant turn. Failures become assistant turns too, never silence.
//!
//! Dropping a `send_message` or `clear` future before it completes releases
//! the pending flag it set, so the session keeps accepting input.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use chempredict_client::{ChatRequest, ChemService};
use chempredict_core::config::ChatConfig;
use chempredict_core::types::ChatTurn;

use crate::error::{ErrorKind, RequestError};

const CONNECTIVITY_REPLY: &str =
    "Cannot connect to the AI backend. Please ensure the server is running.";
const UNAVAILABLE_REPLY: &str = "The AI service is temporarily unavailable. Please check that \
the GOOGLE_API_KEY is configured in the backend.";
const GENERIC_REPLY: &str =
    "I apologize, but I'm having trouble connecting to the research assistant.";

/// What happened to one `send_message` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank, too long, or a reply was still pending. Transcript untouched.
    Ignored,
    Replied(ChatTurn),
    /// The assistant turn carries the user-readable explanation.
    Failed { turn: ChatTurn, error: RequestError },
    /// The manager was detached while waiting; the reply was dropped.
    Discarded,
}

/// What happened to one `clear` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    Ignored,
    Cleared,
    Failed(RequestError),
    Discarded,
}

struct ChatState {
    transcript: Vec<ChatTurn>,
    awaiting_reply: bool,
    clearing: bool,
    epoch: u64,
}

impl ChatState {
    fn is_busy(&self) -> bool {
        self.awaiting_reply || self.clearing
    }
}

#[derive(Clone, Copy, Debug)]
enum Pending {
    Reply,
    Clear,
}

/// Clears the pending flag of a request whose future was dropped early.
struct PendingGuard<'a> {
    manager: &'a ChatSessionManager,
    pending: Pending,
    epoch: u64,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.manager.lock();
        if state.epoch != self.epoch {
            return;
        }
        match self.pending {
            Pending::Reply => state.awaiting_reply = false,
            Pending::Clear => state.clearing = false,
        }
        debug!(pending = ?self.pending, "Chat request cancelled before it completed");
    }
}

/// Drives the multi-turn research chat.
pub struct ChatSessionManager {
    service: Arc<dyn ChemService>,
    session_id: String,
    max_message_length: usize,
    state: Mutex<ChatState>,
}

impl ChatSessionManager {
    pub fn new(service: Arc<dyn ChemService>, config: &ChatConfig) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        let session_id = format!("{}{}", config.session_prefix, &token[..8]);
        info!(%session_id, "Chat session started");
        Self {
            service,
            session_id,
            max_message_length: config.max_message_length,
            state: Mutex::new(ChatState {
                transcript: Vec::new(),
                awaiting_reply: false,
                clearing: false,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Opaque token forwarded with every message. Stable for the session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// True while a sent message has no assistant turn yet.
    pub fn is_awaiting_reply(&self) -> bool {
        self.lock().awaiting_reply
    }

    /// True while a `clear` request is pending. New messages are ignored.
    pub fn is_clearing(&self) -> bool {
        self.lock().clearing
    }

    /// Transcript snapshot in append order.
    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.lock().transcript.clone()
    }

    /// Send one user message and append the assistant's answer.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }
        if message.chars().count() > self.max_message_length {
            debug!(
                limit = self.max_message_length,
                "Chat message exceeds maximum length; ignored"
            );
            return SendOutcome::Ignored;
        }

        let epoch = {
            let mut state = self.lock();
            if state.is_busy() {
                debug!(
                    awaiting_reply = state.awaiting_reply,
                    clearing = state.clearing,
                    "Chat request still pending; message ignored"
                );
                return SendOutcome::Ignored;
            }
            state.transcript.push(ChatTurn::user(message));
            state.awaiting_reply = true;
            state.epoch
        };

        let request = ChatRequest {
            message: message.to_string(),
            session_id: self.session_id.clone(),
        };
        debug!(session_id = %self.session_id, "Sending chat message");
        let mut pending = PendingGuard {
            manager: self,
            pending: Pending::Reply,
            epoch,
            armed: true,
        };
        let response = self.service.chat(&request).await;
        pending.disarm();

        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("Discarding chat reply for detached view");
            return SendOutcome::Discarded;
        }
        state.awaiting_reply = false;

        match response {
            Ok(reply) => {
                let turn = ChatTurn::assistant_with_sources(reply.response, reply.sources);
                state.transcript.push(turn.clone());
                SendOutcome::Replied(turn)
            }
            Err(transport) => {
                let error = RequestError::from(transport);
                warn!(kind = ?error.kind(), error = %error, "Chat request failed");
                let turn = ChatTurn::assistant(Self::failure_reply(&error));
                state.transcript.push(turn.clone());
                SendOutcome::Failed { turn, error }
            }
        }
    }

    /// Clear the conversation on the backend, then locally.
    ///
    /// Ignored while a reply or another clear is pending. The transcript is
    /// kept if the backend call fails.
    pub async fn clear(&self) -> ClearOutcome {
        let epoch = {
            let mut state = self.lock();
            if state.is_busy() {
                return ClearOutcome::Ignored;
            }
            state.clearing = true;
            state.epoch
        };

        let mut pending = PendingGuard {
            manager: self,
            pending: Pending::Clear,
            epoch,
            armed: true,
        };
        let response = self.service.clear_chat(&self.session_id).await;
        pending.disarm();

        let mut state = self.lock();
        if state.epoch != epoch {
            return ClearOutcome::Discarded;
        }
        state.clearing = false;

        match response {
            Ok(()) => {
                info!(
                    session_id = %self.session_id,
                    turns = state.transcript.len(),
                    "Chat session cleared"
                );
                state.transcript.clear();
                ClearOutcome::Cleared
            }
            Err(transport) => {
                let error = RequestError::from(transport);
                warn!(error = %error, "Clearing chat session failed");
                ClearOutcome::Failed(error)
            }
        }
    }

    /// Tear down the current view. A pending reply will be dropped and new
    /// messages are accepted immediately. The transcript is kept.
    pub fn detach(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.awaiting_reply = false;
        state.clearing = false;
        debug!(epoch = state.epoch, "Chat view detached");
    }

    /// Assistant-authored explanation for a failed request.
    pub fn failure_reply(error: &RequestError) -> &'static str {
        match error.kind() {
            ErrorKind::Connectivity => CONNECTIVITY_REPLY,
            ErrorKind::ServiceUnavailable => UNAVAILABLE_REPLY,
            _ => GENERIC_REPLY,
        }
    }
}
