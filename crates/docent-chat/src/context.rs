//! Conversation sessions.
//!
//! A session owns one [`ConversationContext`] for its lifetime: created
//! empty at session start, mutated turn by turn, discarded on expiry. The
//! composer only ever reads the context; all mutation goes through here or
//! through the context's own helpers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docent_core::types::{ConversationContext, Intent, Message};

use crate::types::GeneratedResponse;

/// One visitor conversation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub context: ConversationContext,
}

/// Creates sessions and applies per-turn context updates.
pub struct SessionManager {
    /// Maximum messages retained in a session's history window.
    pub context_messages: usize,
    /// Session timeout in minutes.
    pub session_timeout_minutes: u32,
}

impl SessionManager {
    pub fn new(context_messages: usize, session_timeout_minutes: u32) -> Self {
        Self {
            context_messages,
            session_timeout_minutes,
        }
    }

    /// Create a fresh session with an empty context.
    pub fn create_session(&self) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            started_at: now,
            last_message_at: now,
            context: ConversationContext::new(),
        }
    }

    /// Whether the session has been idle past the configured timeout.
    pub fn is_expired(&self, session: &Session) -> bool {
        let timeout = Duration::minutes(i64::from(self.session_timeout_minutes));
        Utc::now() - session.last_message_at > timeout
    }

    /// Record one query-response turn.
    ///
    /// Appends the user and assistant messages, sets the current intent,
    /// trims the history to the configured window, and refreshes the
    /// activity timestamp.
    pub fn record_turn(
        &self,
        session: &mut Session,
        user_text: &str,
        response: &GeneratedResponse,
        intent: Intent,
    ) {
        session.last_message_at = Utc::now();
        session.context.messages.push(Message::user(user_text));
        session
            .context
            .messages
            .push(Message::assistant(&response.content));
        session.context.current_intent = Some(intent);

        let len = session.context.messages.len();
        if len > self.context_messages {
            session.context.messages.drain(..len - self.context_messages);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
