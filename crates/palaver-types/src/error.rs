use thiserror::Error;

/// Errors from repository operations (used by trait definitions in palaver-core).
///
/// A missing record is never reported here: loads return the empty default.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Errors surfaced by the chat orchestrator.
///
/// Remote LLM failures are folded into the conversation as an error turn
/// and never appear here; only storage and input problems do.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("invalid session id: '{0}'")]
    InvalidSessionId(String),

    #[error("session '{0}' not found")]
    SessionNotFound(String),
}
