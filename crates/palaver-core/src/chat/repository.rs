//! ChatRepository trait definition.
//!
//! One repository covers the Session Store, the Message Log Store and the
//! Model History Mirror Store. All loads of a missing record return the empty
//! default; all saves are full overwrites.

use palaver_types::chat::{SessionId, SessionIndex, Turn};
use palaver_types::error::RepositoryError;
use palaver_types::history::HistoryContent;

/// Repository trait for conversation persistence.
///
/// Implementations live in palaver-infra (e.g., `FileChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Load the session index. Empty when nothing has been stored yet.
    fn load_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<SessionIndex, RepositoryError>> + Send;

    /// Replace the stored session index.
    fn save_sessions(
        &self,
        index: &SessionIndex,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Load the message log for a session. Empty for unknown ids.
    fn load_messages(
        &self,
        id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Replace the stored message log for a session.
    fn save_messages(
        &self,
        id: &SessionId,
        messages: &[Turn],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Load the model history mirror for a session. Empty for unknown ids.
    fn load_history(
        &self,
        id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<HistoryContent>, RepositoryError>> + Send;

    /// Replace the stored model history mirror for a session.
    fn save_history(
        &self,
        id: &SessionId,
        history: &[HistoryContent],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove a session's index entry and both of its records.
    ///
    /// Records that were never written are ignored.
    fn delete_session(
        &self,
        id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
