//! Error types for the chat subsystem.

use docent_core::error::DocentError;
use docent_knowledge::KnowledgeError;

/// Errors from the chat engine.
///
/// Upstream failures (timeouts, rate limits) are not errors here: the
/// composer formats them into user-facing responses instead.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("session lock poisoned: {0}")]
    SessionLock(String),
    #[error("knowledge error: {0}")]
    Knowledge(String),
}

impl From<KnowledgeError> for ChatError {
    fn from(err: KnowledgeError) -> Self {
        ChatError::Knowledge(err.to_string())
    }
}

impl From<ChatError> for DocentError {
    fn from(err: ChatError) -> Self {
        DocentError::Chat(err.to_string())
    }
}
