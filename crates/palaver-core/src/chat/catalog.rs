//! Read and delete access to stored sessions without a remote chat.
//!
//! These operations only touch the repository, so browsing commands can use
//! them without provider credentials. `ChatService` delegates to them too.

use tracing::{info, warn};

use palaver_types::chat::{SessionId, SessionIndex, SessionTitle, Turn};
use palaver_types::error::ChatError;

use super::repository::ChatRepository;

/// Every known session id with its title, oldest first.
pub async fn list_sessions<R: ChatRepository>(repo: &R) -> Result<SessionIndex, ChatError> {
    Ok(repo.load_sessions().await?)
}

/// Title and message log of a known session.
pub async fn load_transcript<R: ChatRepository>(
    repo: &R,
    id: &SessionId,
) -> Result<(SessionTitle, Vec<Turn>), ChatError> {
    let index = repo.load_sessions().await?;
    let title = index
        .title(id)
        .cloned()
        .ok_or_else(|| ChatError::SessionNotFound(id.to_string()))?;
    let messages = repo.load_messages(id).await?;
    Ok((title, messages))
}

/// Remove a known session and both of its records, returning its title.
pub async fn delete_session<R: ChatRepository>(
    repo: &R,
    id: &SessionId,
) -> Result<SessionTitle, ChatError> {
    let index = repo.load_sessions().await?;
    let Some(title) = index.title(id).cloned() else {
        warn!(session_id = %id, "Attempted to delete non-existent session");
        return Err(ChatError::SessionNotFound(id.to_string()));
    };
    repo.delete_session(id).await?;
    info!(session_id = %id, "Session deleted");
    Ok(title)
}
