//! Chat session, turn, and session index types for Palaver.
//!
//! These types model a conversation as the user sees it: an ordered log of
//! turns keyed by a session id, plus the global index mapping every known
//! session id to its display title.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Text stored as the assistant turn when a stream produced no usable text.
pub const EMPTY_RESPONSE_FALLBACK: &str = "Error: AI response was empty or invalid.";

/// Prefix of every generated session title.
const TITLE_PREFIX: &str = "ChatSession-";

/// Speaker of a turn. Only two roles ever occur in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// One message in a conversation, tagged by speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Opaque identifier of one conversation.
///
/// Used verbatim as a file-name stem by the filesystem repository, so only
/// ASCII alphanumerics, `.`, `-` and `_` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Create a fresh id from the current wall-clock time.
    pub fn generate() -> Self {
        Self::from_time(Utc::now())
    }

    /// Build the id for a given instant: `<unix-seconds>.<microseconds>`.
    pub fn from_time(at: DateTime<Utc>) -> Self {
        Self(format!(
            "{}.{:06}",
            at.timestamp(),
            at.timestamp_subsec_micros()
        ))
    }

    /// Validate a user-supplied id.
    pub fn parse(raw: &str) -> Result<Self, ChatError> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed != "."
            && trimmed != ".."
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ChatError::InvalidSessionId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation instant for ids produced by [`SessionId::generate`].
    ///
    /// Returns `None` for ids that are not `<seconds>.<microseconds>`.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let (secs, micros) = self.0.split_once('.')?;
        if micros.len() != 6 {
            return None;
        }
        let secs: i64 = secs.parse().ok()?;
        let micros: u32 = micros.parse().ok()?;
        DateTime::from_timestamp(secs, micros * 1_000)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = ChatError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// Display title of a session. Derived from the id once and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionTitle(String);

impl SessionTitle {
    pub fn for_session(id: &SessionId) -> Self {
        Self(format!("{TITLE_PREFIX}{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The Session Store value: every known session id and its title.
///
/// Ids generated from timestamps sort chronologically, so iteration order
/// doubles as "oldest first".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionIndex {
    entries: BTreeMap<SessionId, SessionTitle>,
}

impl SessionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id -> title` unless `id` is already present.
    ///
    /// Returns `true` when an entry was inserted. An existing title is never
    /// overwritten.
    pub fn register(&mut self, id: SessionId, title: SessionTitle) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, title);
        true
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn title(&self, id: &SessionId) -> Option<&SessionTitle> {
        self.entries.get(id)
    }

    /// Remove an entry, returning its title if it existed.
    pub fn remove(&mut self, id: &SessionId) -> Option<SessionTitle> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&SessionId, &SessionTitle)> {
        self.entries.iter()
    }
}

/// Round-trip state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    #[default]
    Idle,
    AwaitingResponse,
}

/// How a submitted round-trip ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitStatus {
    /// The model streamed a non-empty reply.
    Completed,
    /// The stream finished without usable text; the fallback text was stored.
    EmptyResponse,
    /// The remote call failed; an error turn was stored instead of a reply.
    Failed { message: String },
}

/// Result of one `submit` round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The assistant turn that was appended to the message log.
    pub reply: Turn,
    pub status: SubmitStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::User, Role::Assistant] {
            let s = role.to_string();
            let parsed: Role = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);
    }

    #[test]
    fn test_turn_serialize_shape() {
        let turn = Turn::user("hello");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "text": "hello"}));
    }

    #[test]
    fn test_session_id_from_time() {
        let at = Utc.timestamp_opt(1_718_000_000, 42_000).unwrap();
        let id = SessionId::from_time(at);
        assert_eq!(id.as_str(), "1718000000.000042");
    }

    #[test]
    fn test_session_id_created_at() {
        let at = Utc.timestamp_opt(1_718_000_000, 123_456_000).unwrap();
        assert_eq!(SessionId::from_time(at).created_at(), Some(at));
        assert!(SessionId::parse("my-chat").unwrap().created_at().is_none());
        assert!(SessionId::parse("12.5").unwrap().created_at().is_none());
    }

    #[test]
    fn test_session_id_parse_rejects_paths() {
        assert!(SessionId::parse("1718000000.5").is_ok());
        assert!(SessionId::parse("my-chat_2").is_ok());
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("..").is_err());
        assert!(SessionId::parse("../etc/passwd").is_err());
        assert!(SessionId::parse("a/b").is_err());
        assert!(SessionId::parse("a b").is_err());
    }

    #[test]
    fn test_session_id_deserialize_validates() {
        let id: SessionId = serde_json::from_str("\"1718000000.5\"").unwrap();
        assert_eq!(id.as_str(), "1718000000.5");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1718000000.5\"");
        assert!(serde_json::from_str::<SessionId>("\"../x\"").is_err());
        assert!(serde_json::from_str::<SessionIndex>(r#"{"../x": "t"}"#).is_err());
    }

    #[test]
    fn test_session_title_derivation() {
        let id = SessionId::parse("1718000000.5").unwrap();
        assert_eq!(
            SessionTitle::for_session(&id).as_str(),
            "ChatSession-1718000000.5"
        );
    }

    #[test]
    fn test_register_is_first_write_wins() {
        let mut index = SessionIndex::new();
        let id = SessionId::parse("s1").unwrap();
        let first = SessionTitle::for_session(&id);
        let other = SessionTitle::for_session(&SessionId::parse("other").unwrap());

        assert!(index.register(id.clone(), first.clone()));
        assert!(!index.register(id.clone(), other));
        assert_eq!(index.title(&id), Some(&first));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_session_index_serializes_as_map() {
        let mut index = SessionIndex::new();
        let id = SessionId::parse("s1").unwrap();
        index.register(id.clone(), SessionTitle::for_session(&id));
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json, serde_json::json!({"s1": "ChatSession-s1"}));
        let parsed: SessionIndex = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, index);
    }

    #[test]
    fn test_chat_state_default() {
        assert_eq!(ChatState::default(), ChatState::Idle);
    }

    #[test]
    fn test_submit_status_serde() {
        let status = SubmitStatus::Failed {
            message: "boom".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
    }
}
