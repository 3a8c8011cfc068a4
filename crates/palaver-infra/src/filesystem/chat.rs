//! JSON-file chat repository.
//!
//! Layout under the data directory:
//!
//! ```text
//! chats/sessions.json          session id -> title
//! chats/<id>-messages.json     message log
//! chats/<id>-history.json      model history mirror
//! ```
//!
//! Every record is pretty-printed JSON and every save rewrites the whole file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use palaver_core::chat::repository::ChatRepository;
use palaver_core::storage::fs::FileSystem;
use palaver_types::chat::{SessionId, SessionIndex, Turn};
use palaver_types::error::RepositoryError;
use palaver_types::history::HistoryContent;

use super::LocalFileSystem;

const CHATS_DIR: &str = "chats";
const SESSIONS_FILE: &str = "sessions.json";

/// `ChatRepository` storing each record as a JSON file.
pub struct FileChatRepository<F: FileSystem = LocalFileSystem> {
    fs: F,
    chats_dir: PathBuf,
}

impl FileChatRepository<LocalFileSystem> {
    /// Repository rooted at `{data_dir}/chats` on the local disk.
    pub fn local(data_dir: &Path) -> Self {
        Self::new(LocalFileSystem::new(), data_dir)
    }
}

impl<F: FileSystem> FileChatRepository<F> {
    pub fn new(fs: F, data_dir: &Path) -> Self {
        Self {
            fs,
            chats_dir: data_dir.join(CHATS_DIR),
        }
    }

    pub fn chats_dir(&self) -> &Path {
        &self.chats_dir
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.chats_dir.join(SESSIONS_FILE)
    }

    pub fn messages_path(&self, id: &SessionId) -> PathBuf {
        self.chats_dir.join(format!("{id}-messages.json"))
    }

    pub fn history_path(&self, id: &SessionId) -> PathBuf {
        self.chats_dir.join(format!("{id}-history.json"))
    }

    async fn load_json<T>(&self, path: &Path) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned + Default,
    {
        let Some(content) = self.fs.read_file(path).await? else {
            debug!(path = %path.display(), "Record not found, using empty default");
            return Ok(T::default());
        };
        serde_json::from_str(&content).map_err(|e| {
            RepositoryError::Serialization(format!("{}: {e}", path.display()))
        })
    }

    async fn save_json<T>(&self, path: &Path, value: &T) -> Result<(), RepositoryError>
    where
        T: Serialize + ?Sized,
    {
        let content = serde_json::to_string_pretty(value)?;
        self.fs.write_file(path, &content).await?;
        debug!(path = %path.display(), bytes = content.len(), "Record saved");
        Ok(())
    }
}

impl<F: FileSystem> ChatRepository for FileChatRepository<F> {
    async fn load_sessions(&self) -> Result<SessionIndex, RepositoryError> {
        self.load_json(&self.sessions_path()).await
    }

    async fn save_sessions(&self, index: &SessionIndex) -> Result<(), RepositoryError> {
        self.save_json(&self.sessions_path(), index).await
    }

    async fn load_messages(&self, id: &SessionId) -> Result<Vec<Turn>, RepositoryError> {
        self.load_json(&self.messages_path(id)).await
    }

    async fn save_messages(&self, id: &SessionId, messages: &[Turn]) -> Result<(), RepositoryError> {
        self.save_json(&self.messages_path(id), messages).await
    }

    async fn load_history(&self, id: &SessionId) -> Result<Vec<HistoryContent>, RepositoryError> {
        self.load_json(&self.history_path(id)).await
    }

    async fn save_history(
        &self,
        id: &SessionId,
        history: &[HistoryContent],
    ) -> Result<(), RepositoryError> {
        self.save_json(&self.history_path(id), history).await
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), RepositoryError> {
        let mut index = self.load_sessions().await?;
        if index.remove(id).is_some() {
            self.save_sessions(&index).await?;
        }
        let messages = self.fs.remove_file(&self.messages_path(id)).await?;
        let history = self.fs.remove_file(&self.history_path(id)).await?;
        debug!(session_id = %id, messages, history, "Session records removed");
        Ok(())
    }
}
