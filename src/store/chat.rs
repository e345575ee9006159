//! Conversation list and the reducer that folds stream events into it.

use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Conversation, Message, MessageRole};
use crate::sse::{ChatEvent, ChatEventKind};

/// Title given to a conversation before its first message.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Characters of the first message kept in a derived title.
pub const TITLE_PREFIX_CHARS: usize = 30;

/// Conversations (newest first), the selected one, and whether a reply is
/// in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    conversations: Vec<Conversation>,
    current_id: Option<String>,
    is_loading: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State seeded from a server-side list, nothing selected.
    pub fn with_conversations(conversations: Vec<Conversation>) -> Self {
        Self {
            conversations,
            ..Self::default()
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// The selected conversation, if it still exists.
    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.current_id.as_deref().and_then(|id| self.conversation(id))
    }

    /// Create an empty conversation at the front of the list and select it.
    ///
    /// The id is the current Unix time in milliseconds, bumped past any id
    /// already in use.
    pub fn create_conversation(&mut self) -> &Conversation {
        let mut millis = Utc::now().timestamp_millis();
        while self.conversation(&millis.to_string()).is_some() {
            millis += 1;
        }
        let id = millis.to_string();

        debug!(conversation_id = %id, "created conversation");
        self.conversations
            .insert(0, Conversation::new(id.clone(), DEFAULT_TITLE));
        self.current_id = Some(id);
        &self.conversations[0]
    }

    /// Append a message. The first message also sets the title.
    pub fn add_message(&mut self, conversation_id: &str, message: Message) -> Result<(), StoreError> {
        let conversation = self.conversation_mut(conversation_id)?;
        if conversation.messages.is_empty() {
            conversation.title = derive_title(&message.content);
        }
        conversation.messages.push(message);
        debug!(
            conversation_id,
            message_count = conversation.messages.len(),
            "added message"
        );
        Ok(())
    }

    /// Replace the content of an existing message.
    pub fn update_message(
        &mut self,
        conversation_id: &str,
        message_id: &str,
        content: impl Into<String>,
    ) -> Result<(), StoreError> {
        let conversation = self.conversation_mut(conversation_id)?;
        let Some(message) = conversation.messages.iter_mut().find(|m| m.id == message_id) else {
            error!(conversation_id, message_id, "message not found");
            return Err(StoreError::MessageNotFound {
                conversation_id: conversation_id.to_string(),
                message_id: message_id.to_string(),
            });
        };
        message.content = content.into();
        debug!(
            conversation_id,
            message_id,
            content_len = message.content.chars().count(),
            "updated message"
        );
        Ok(())
    }

    /// Remove a conversation. Returns whether it existed.
    ///
    /// Deleting the selected conversation selects the first remaining one.
    pub fn delete_conversation(&mut self, conversation_id: &str) -> bool {
        let Some(index) = self.conversations.iter().position(|c| c.id == conversation_id) else {
            return false;
        };
        self.conversations.remove(index);

        if self.current_id.as_deref() == Some(conversation_id) {
            self.current_id = self.conversations.first().map(|c| c.id.clone());
        }
        true
    }

    /// Select a conversation. The id is not checked against the list.
    pub fn set_current(&mut self, conversation_id: Option<String>) {
        self.current_id = conversation_id;
    }

    /// Fold one stream event into the conversation.
    ///
    /// - `content` appends to the streaming assistant message, creating it
    ///   on the first fragment
    /// - `done` finalizes that message and clears the loading flag
    /// - `error` finalizes it with the error text and clears the loading flag
    ///
    /// Other event types and unknown conversations leave the state as is.
    pub fn apply_event(mut self, conversation_id: &str, event: &ChatEvent) -> Self {
        let kind = event.kind();
        if kind == ChatEventKind::Other {
            debug!(event_type = %event.event_type, "ignoring chat event");
            return self;
        }

        let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == conversation_id)
        else {
            warn!(conversation_id, "chat event for unknown conversation");
            return self;
        };

        match kind {
            ChatEventKind::Content => {
                let fragment = event.content.as_deref().unwrap_or_default();
                streaming_message(conversation).append_token(fragment);
            }
            ChatEventKind::Done => {
                if let Some(message) = conversation.streaming_message_mut() {
                    message.finalize();
                }
                self.is_loading = false;
            }
            ChatEventKind::Error => {
                let text = event
                    .error_message()
                    .unwrap_or_else(|| "Unknown error".to_string());
                warn!(conversation_id, error = %text, "chat stream reported an error");
                let message = streaming_message(conversation);
                message.error = Some(text);
                message.finalize();
                self.is_loading = false;
            }
            ChatEventKind::Other => {}
        }

        self
    }

    fn conversation_mut(&mut self, conversation_id: &str) -> Result<&mut Conversation, StoreError> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| {
                error!(conversation_id, "conversation not found");
                StoreError::ConversationNotFound(conversation_id.to_string())
            })
    }
}

/// The in-progress assistant reply, started if there is none.
fn streaming_message(conversation: &mut Conversation) -> &mut Message {
    let index = conversation
        .messages
        .iter()
        .rposition(|m| m.is_streaming && m.role == MessageRole::Assistant);
    let index = match index {
        Some(index) => index,
        None => {
            conversation
                .messages
                .push(Message::streaming_assistant(Uuid::new_v4().to_string()));
            conversation.messages.len() - 1
        }
    };
    &mut conversation.messages[index]
}

/// First characters of the message followed by `...`.
fn derive_title(content: &str) -> String {
    let prefix: String = content.chars().take(TITLE_PREFIX_CHARS).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state_with_conversation() -> (ChatState, String) {
        let mut state = ChatState::new();
        let id = state.create_conversation().id.clone();
        (state, id)
    }

    #[test]
    fn test_create_conversation_selects_it() {
        let (state, id) = state_with_conversation();
        let current = state.current_conversation().unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.title, DEFAULT_TITLE);
        assert!(current.messages.is_empty());
        assert!(id.parse::<i64>().is_ok());
    }

    #[test]
    fn test_create_conversation_newest_first_unique_ids() {
        let mut state = ChatState::new();
        let first = state.create_conversation().id.clone();
        let second = state.create_conversation().id.clone();

        assert_ne!(first, second);
        assert_eq!(state.conversations()[0].id, second);
        assert_eq!(state.conversations()[1].id, first);
        assert_eq!(state.current_id(), Some(second.as_str()));
    }

    #[test]
    fn test_first_message_sets_title() {
        let (mut state, id) = state_with_conversation();
        let long = "Explain the borrow checker to me like I am five years old";
        state.add_message(&id, Message::user("m1", long)).unwrap();
        assert_eq!(
            state.conversation(&id).unwrap().title,
            "Explain the borrow checker to ..."
        );

        state.add_message(&id, Message::user("m2", "and again")).unwrap();
        assert_eq!(
            state.conversation(&id).unwrap().title,
            "Explain the borrow checker to ..."
        );
    }

    #[test]
    fn test_short_first_message_still_gets_ellipsis() {
        let (mut state, id) = state_with_conversation();
        state.add_message(&id, Message::user("m1", "hi")).unwrap();
        assert_eq!(state.conversation(&id).unwrap().title, "hi...");
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let (mut state, id) = state_with_conversation();
        let text = "你好".repeat(20);
        state.add_message(&id, Message::user("m1", text)).unwrap();
        let title = &state.conversation(&id).unwrap().title;
        assert_eq!(title.chars().count(), TITLE_PREFIX_CHARS + 3);
    }

    #[test]
    fn test_add_message_unknown_conversation() {
        let mut state = ChatState::new();
        let err = state.add_message("nope", Message::user("m1", "x")).unwrap_err();
        assert_eq!(err, StoreError::ConversationNotFound("nope".to_string()));
        assert!(state.conversations().is_empty());
    }

    #[test]
    fn test_update_message() {
        let (mut state, id) = state_with_conversation();
        state.add_message(&id, Message::user("m1", "draft")).unwrap();

        state.update_message(&id, "m1", "final").unwrap();
        assert_eq!(state.conversation(&id).unwrap().messages[0].content, "final");

        let err = state.update_message(&id, "m9", "x").unwrap_err();
        assert!(matches!(err, StoreError::MessageNotFound { .. }));
        assert!(state.update_message("zzz", "m1", "x").is_err());
    }

    #[test]
    fn test_delete_current_selects_first_remaining() {
        let mut state = ChatState::new();
        let older = state.create_conversation().id.clone();
        let newer = state.create_conversation().id.clone();
        state.set_current(Some(older.clone()));

        assert!(state.delete_conversation(&older));
        assert_eq!(state.current_id(), Some(newer.as_str()));

        assert!(state.delete_conversation(&newer));
        assert_eq!(state.current_id(), None);
        assert!(!state.delete_conversation(&newer));
    }

    #[test]
    fn test_delete_other_keeps_selection() {
        let mut state = ChatState::new();
        let older = state.create_conversation().id.clone();
        let newer = state.create_conversation().id.clone();

        state.delete_conversation(&older);
        assert_eq!(state.current_id(), Some(newer.as_str()));
    }

    #[test]
    fn test_apply_content_then_done() {
        let (mut state, id) = state_with_conversation();
        state.add_message(&id, Message::user("m1", "hi")).unwrap();
        state.set_loading(true);

        let state = [
            ChatEvent::content("Hel"),
            ChatEvent::content("lo"),
            ChatEvent::done(),
        ]
        .iter()
        .fold(state, |s, event| s.apply_event(&id, event));

        let messages = &state.conversation(&id).unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "Hello");
        assert!(!messages[1].is_streaming);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_apply_error_records_text() {
        let (mut state, id) = state_with_conversation();
        state.set_loading(true);
        let event: ChatEvent =
            serde_json::from_value(json!({"type": "error", "message": "model overloaded"})).unwrap();

        let state = state
            .apply_event(&id, &ChatEvent::content("partial"))
            .apply_event(&id, &event);

        let reply = &state.conversation(&id).unwrap().messages[0];
        assert_eq!(reply.content, "partial");
        assert_eq!(reply.error.as_deref(), Some("model overloaded"));
        assert!(!reply.is_streaming);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_apply_ignores_other_types_and_unknown_conversations() {
        let (mut state, id) = state_with_conversation();
        state.set_loading(true);
        let before = state.clone();

        let ping: ChatEvent = serde_json::from_value(json!({"type": "ping"})).unwrap();
        let state = state.apply_event(&id, &ping);
        assert_eq!(state, before);

        let state = state.apply_event("missing", &ChatEvent::content("x"));
        assert_eq!(state, before);
    }

    #[test]
    fn test_second_reply_starts_new_message() {
        let (state, id) = state_with_conversation();
        let state = state
            .apply_event(&id, &ChatEvent::content("one"))
            .apply_event(&id, &ChatEvent::done())
            .apply_event(&id, &ChatEvent::content("two"));

        let messages = &state.conversation(&id).unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "two");
        assert!(messages[1].is_streaming);
    }
}
