//! Model History Mirror types.
//!
//! The mirror is the remote chat's own view of the conversation, stored in
//! the Gemini `Content` shape (`{"role": "user"|"model", "parts": [{"text"}]}`)
//! so a persisted file can seed a new remote chat unchanged. The orchestrator
//! treats these values as opaque; only the remote chat handle builds them.

use serde::{Deserialize, Serialize};

use crate::llm::{Message, MessageRole};

/// Author of a history entry, in the remote API's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Model,
}

/// A single text part of a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPart {
    pub text: String,
}

/// One entry of the remote chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryContent {
    pub role: HistoryRole,
    pub parts: Vec<HistoryPart>,
}

impl HistoryContent {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::User,
            parts: vec![HistoryPart { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::Model,
            parts: vec![HistoryPart { text: text.into() }],
        }
    }

    /// Concatenated text of all parts.
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }

    /// Convert into a provider-agnostic request message.
    pub fn to_message(&self) -> Message {
        let role = match self.role {
            HistoryRole::User => MessageRole::User,
            HistoryRole::Model => MessageRole::Assistant,
        };
        Message {
            role,
            content: self.text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_content_wire_shape() {
        let entry = HistoryContent::model("Hi there");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "model", "parts": [{"text": "Hi there"}]})
        );
    }

    #[test]
    fn test_multi_part_text_concatenates() {
        let entry = HistoryContent {
            role: HistoryRole::Model,
            parts: vec![
                HistoryPart {
                    text: "Hello ".to_string(),
                },
                HistoryPart {
                    text: "world".to_string(),
                },
            ],
        };
        assert_eq!(entry.text(), "Hello world");
    }

    #[test]
    fn test_to_message_maps_model_to_assistant() {
        let msg = HistoryContent::model("ok").to_message();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.content, "ok");

        let msg = HistoryContent::user("q").to_message();
        assert_eq!(msg.role, MessageRole::User);
    }
}
