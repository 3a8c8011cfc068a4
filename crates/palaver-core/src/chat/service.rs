//! Chat service orchestrating one conversation round-trip.
//!
//! ChatService coordinates between the ChatRepository and the remote chat
//! handle: it opens sessions from persisted records, records the user turn,
//! streams the reply, folds it into the assistant turn, resynchronizes the
//! model history mirror and saves both records.

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use palaver_types::chat::{
    ChatState, EMPTY_RESPONSE_FALLBACK, SessionId, SessionIndex, SessionTitle, SubmitOutcome,
    SubmitStatus, Turn,
};
use palaver_types::error::ChatError;

use crate::llm::box_provider::BoxLlmProvider;

use super::catalog;
use super::remote::{ChatSettings, RemoteChat};
use super::repository::ChatRepository;
use super::response::ResponseAccumulator;
use super::session::ChatSession;

/// Orchestrates chat sessions and their persistence.
///
/// Generic over `ChatRepository` to maintain clean architecture
/// (palaver-core never depends on palaver-infra).
pub struct ChatService<R: ChatRepository> {
    repo: R,
    provider: Arc<BoxLlmProvider>,
    settings: ChatSettings,
    /// One lock per session id so two handles on the same id never interleave.
    /// Entries are kept for the life of the service.
    session_locks: DashMap<SessionId, Arc<Mutex<()>>>,
    /// Guards the load-modify-save of the session index.
    index_lock: Mutex<()>,
}

impl<R: ChatRepository> ChatService<R> {
    pub fn new(repo: R, provider: BoxLlmProvider, settings: ChatSettings) -> Self {
        Self {
            repo,
            provider: Arc::new(provider),
            settings,
            session_locks: DashMap::new(),
            index_lock: Mutex::new(()),
        }
    }

    /// Access the repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    // --- Session lifecycle ---

    /// Open a session for `id`.
    ///
    /// Known ids are resumed from their stored records; unknown ids start
    /// with an empty message log and mirror. Nothing is written until the
    /// first `submit`.
    pub async fn begin_session(&self, id: SessionId) -> Result<ChatSession, ChatError> {
        let index = self.repo.load_sessions().await?;

        let (title, messages, history) = match index.title(&id) {
            Some(title) => {
                let messages = self.repo.load_messages(&id).await?;
                let history = self.repo.load_history(&id).await?;
                info!(
                    session_id = %id,
                    messages = messages.len(),
                    history = history.len(),
                    "Session resumed"
                );
                (title.clone(), messages, history)
            }
            None => {
                info!(session_id = %id, "Session started");
                (SessionTitle::for_session(&id), Vec::new(), Vec::new())
            }
        };

        let remote = RemoteChat::start(
            Arc::clone(&self.provider),
            self.settings.clone(),
            history.clone(),
        );
        Ok(ChatSession::new(id, title, messages, history, remote))
    }

    /// Open a session under a freshly generated id.
    pub async fn new_session(&self) -> Result<ChatSession, ChatError> {
        self.begin_session(SessionId::generate()).await
    }

    /// Run one round-trip: record `text`, stream the reply, persist.
    ///
    /// `on_fragment` is called once per non-empty fragment with exactly the
    /// text appended to the reply. A remote failure does not surface as an
    /// error: it becomes an `"Error: ..."` assistant turn and a `Failed`
    /// status. Storage failures are returned as `ChatError::Repository`.
    pub async fn submit<F>(
        &self,
        session: &mut ChatSession,
        text: &str,
        mut on_fragment: F,
    ) -> Result<SubmitOutcome, ChatError>
    where
        F: FnMut(&str),
    {
        let lock = self.session_lock(&session.id);
        let _guard = lock.lock().await;

        self.register_session(&session.id, &session.title).await?;
        self.sync_with_store(session).await?;

        session.messages.push(Turn::user(text));
        session.state = ChatState::AwaitingResponse;
        debug!(session_id = %session.id, "Awaiting response");

        let mut response = ResponseAccumulator::new();
        let mut failure = None;
        {
            let mut fragments = session.remote.send(text);
            while let Some(fragment) = fragments.next().await {
                match fragment {
                    Ok(fragment) => {
                        if let Some(appended) = response.push(&fragment) {
                            on_fragment(appended);
                        }
                    }
                    Err(e) => {
                        warn!(session_id = %session.id, error = %e, "Remote chat failed");
                        failure = Some(e);
                        break;
                    }
                }
            }
        }

        let fragment_count = response.fragment_count();
        let (reply_text, status) = match (failure, response.finish()) {
            (Some(e), _) => (
                format!("Error: {e}"),
                SubmitStatus::Failed {
                    message: e.to_string(),
                },
            ),
            (None, Some(text)) => (text, SubmitStatus::Completed),
            (None, None) => {
                warn!(session_id = %session.id, "Remote chat returned no text");
                (EMPTY_RESPONSE_FALLBACK.to_string(), SubmitStatus::EmptyResponse)
            }
        };

        let reply = Turn::assistant(reply_text);
        session.messages.push(reply.clone());
        session.state = ChatState::Idle;
        session.history = session.remote.history().to_vec();

        self.repo
            .save_messages(&session.id, &session.messages)
            .await?;
        self.repo.save_history(&session.id, &session.history).await?;

        info!(
            session_id = %session.id,
            fragments = fragment_count,
            messages = session.messages.len(),
            status = ?status,
            "Round-trip complete"
        );

        Ok(SubmitOutcome { reply, status })
    }

    // --- Session index ---

    /// Add `id -> title` to the session index unless `id` is already known.
    ///
    /// Returns `true` when the index was changed and saved.
    pub async fn register_session(
        &self,
        id: &SessionId,
        title: &SessionTitle,
    ) -> Result<bool, ChatError> {
        let _guard = self.index_lock.lock().await;
        let mut index = self.repo.load_sessions().await?;
        if !index.register(id.clone(), title.clone()) {
            return Ok(false);
        }
        self.repo.save_sessions(&index).await?;
        info!(session_id = %id, title = %title, "Session registered");
        Ok(true)
    }

    /// Every known session id with its title, oldest first.
    pub async fn list_sessions(&self) -> Result<SessionIndex, ChatError> {
        catalog::list_sessions(&self.repo).await
    }

    /// Load a known session's message log without opening a remote chat.
    pub async fn load_transcript(&self, id: &SessionId) -> Result<Vec<Turn>, ChatError> {
        let (_, messages) = catalog::load_transcript(&self.repo, id).await?;
        Ok(messages)
    }

    /// Remove a known session and both of its records.
    pub async fn delete_session(&self, id: &SessionId) -> Result<(), ChatError> {
        let lock = self.session_lock(id);
        let session_guard = lock.lock().await;
        let index_guard = self.index_lock.lock().await;

        catalog::delete_session(&self.repo, id).await?;

        drop(index_guard);
        drop(session_guard);
        Ok(())
    }

    /// Adopt the stored records when another handle on the same id has
    /// saved since `session` last read or wrote them. Caller holds the id lock.
    async fn sync_with_store(&self, session: &mut ChatSession) -> Result<(), ChatError> {
        let messages = self.repo.load_messages(&session.id).await?;
        let history = self.repo.load_history(&session.id).await?;
        if messages == session.messages && history == session.history {
            return Ok(());
        }

        debug!(
            session_id = %session.id,
            stored_messages = messages.len(),
            local_messages = session.messages.len(),
            "Session records changed on disk, reloading"
        );
        session.remote = RemoteChat::start(
            Arc::clone(&self.provider),
            self.settings.clone(),
            history.clone(),
        );
        session.messages = messages;
        session.history = history;
        Ok(())
    }

    fn session_lock(&self, id: &SessionId) -> Arc<Mutex<()>> {
        Arc::clone(
            self.session_locks
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}
