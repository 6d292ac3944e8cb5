//! Error types for the knowledge subsystem.

use docent_core::error::DocentError;
use uuid::Uuid;

/// Errors from the knowledge store.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("entry not found: {0}")]
    NotFound(Uuid),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<KnowledgeError> for DocentError {
    fn from(err: KnowledgeError) -> Self {
        DocentError::Knowledge(err.to_string())
    }
}

/// A specialized `Result` type for knowledge operations.
pub type Result<T> = std::result::Result<T, KnowledgeError>;
