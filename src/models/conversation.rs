use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deserialize_id;

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default = "Utc::now", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Set while the reply is still arriving
    #[serde(default)]
    pub is_streaming: bool,
    /// Failure reported by the backend for this reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Message {
    pub fn new(id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            is_streaming: false,
            error: None,
        }
    }

    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::User, content)
    }

    /// An empty assistant message waiting for streamed content.
    pub fn streaming_assistant(id: impl Into<String>) -> Self {
        Self {
            is_streaming: true,
            ..Self::new(id, MessageRole::Assistant, String::new())
        }
    }

    /// Append a streamed fragment.
    pub fn append_token(&mut self, token: &str) {
        self.content.push_str(token);
    }

    /// Mark the message complete.
    pub fn finalize(&mut self) {
        self.is_streaming = false;
    }
}

/// A conversation and its messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default = "Utc::now", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// The assistant message currently being streamed, if any.
    pub fn streaming_message_mut(&mut self) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .rev()
            .find(|m| m.is_streaming && m.role == MessageRole::Assistant)
    }
}

/// Body of `GET /conversations`: either a bare array or wrapped in an object.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConversationList {
    Bare(Vec<Conversation>),
    Wrapped { conversations: Vec<Conversation> },
}

impl ConversationList {
    pub fn into_vec(self) -> Vec<Conversation> {
        match self {
            ConversationList::Bare(list) => list,
            ConversationList::Wrapped { conversations } => conversations,
        }
    }
}
