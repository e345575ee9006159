//! Event payloads carried by the chat stream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Classification of a [`ChatEvent`] by its `type` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEventKind {
    /// A fragment of assistant text in `content`
    Content,
    /// The reply is complete
    Done,
    /// The backend reported a failure
    Error,
    /// Any other discriminator; ignored by the chat state
    Other,
}

/// One event decoded from a `data: ` frame of `/chat/stream`.
///
/// Any JSON document deserializes into a `ChatEvent`. A missing or
/// non-string `type` reads as `""` (kind [`ChatEventKind::Other`]). A
/// non-string `content` stays in `extra` with every other field. A payload
/// that is not an object is kept whole under `extra["data"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ChatEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Value> for ChatEvent {
    fn from(value: Value) -> Self {
        let mut extra = match value {
            Value::Object(map) => map,
            other => {
                let mut extra = Map::new();
                extra.insert("data".to_string(), other);
                extra
            }
        };

        let event_type = match extra.remove("type") {
            Some(Value::String(event_type)) => event_type,
            _ => String::new(),
        };
        let content = match extra.remove("content") {
            Some(Value::String(content)) => Some(content),
            Some(Value::Null) | None => None,
            Some(other) => {
                extra.insert("content".to_string(), other);
                None
            }
        };

        Self {
            event_type,
            content,
            extra,
        }
    }
}

impl ChatEvent {
    fn with_type(event_type: &str, content: Option<String>) -> Self {
        Self {
            event_type: event_type.to_string(),
            content,
            extra: Map::new(),
        }
    }

    /// A `content` event carrying a text fragment.
    pub fn content(text: impl Into<String>) -> Self {
        Self::with_type("content", Some(text.into()))
    }

    /// A `done` event.
    pub fn done() -> Self {
        Self::with_type("done", None)
    }

    /// An `error` event with the message in `content`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_type("error", Some(message.into()))
    }

    pub fn kind(&self) -> ChatEventKind {
        match self.event_type.as_str() {
            "content" => ChatEventKind::Content,
            "done" => ChatEventKind::Done,
            "error" => ChatEventKind::Error,
            _ => ChatEventKind::Other,
        }
    }

    /// Length in characters of the content fragment, zero when absent.
    pub fn content_len(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
    }

    /// Human-readable error text for an `error` event.
    ///
    /// Prefers a `message` field, then `error`, then `content`.
    pub fn error_message(&self) -> Option<String> {
        ["message", "error"]
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| self.content.clone())
    }
}
