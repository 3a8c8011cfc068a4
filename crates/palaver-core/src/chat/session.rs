//! In-memory state of one open conversation.
//!
//! A `ChatSession` couples the persisted records (message log and model
//! history mirror) with the live `RemoteChat` handle. It is produced by
//! `ChatService::begin_session` and mutated only through
//! `ChatService::submit`.

use palaver_types::chat::{ChatState, SessionId, SessionTitle, Turn};
use palaver_types::history::HistoryContent;

use super::remote::RemoteChat;

pub struct ChatSession {
    pub(crate) id: SessionId,
    pub(crate) title: SessionTitle,
    pub(crate) messages: Vec<Turn>,
    pub(crate) history: Vec<HistoryContent>,
    pub(crate) remote: RemoteChat,
    pub(crate) state: ChatState,
}

impl ChatSession {
    pub(crate) fn new(
        id: SessionId,
        title: SessionTitle,
        messages: Vec<Turn>,
        history: Vec<HistoryContent>,
        remote: RemoteChat,
    ) -> Self {
        Self {
            id,
            title,
            messages,
            history,
            remote,
            state: ChatState::Idle,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn title(&self) -> &SessionTitle {
        &self.title
    }

    /// The visible transcript, oldest first.
    pub fn messages(&self) -> &[Turn] {
        &self.messages
    }

    /// The model history mirror as last synchronized from the remote handle.
    pub fn history(&self) -> &[HistoryContent] {
        &self.history
    }

    pub fn remote(&self) -> &RemoteChat {
        &self.remote
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Number of completed user/assistant exchanges.
    pub fn exchange_count(&self) -> usize {
        self.messages.len() / 2
    }
}
