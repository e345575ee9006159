//! `conversations`, `chat` and `render`.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

use super::api_failure;
use crate::api::ApiClient;
use crate::markdown::render_markdown;
use crate::models::{ChatRequest, Message};
use crate::sse::ChatEventKind;
use crate::store::ChatState;
use crate::traits::{HttpClient, SessionStore};

/// Print one line per conversation: id, then title.
pub async fn handle_conversations<C, S>(api: &ApiClient<C, S>, out: &mut impl Write) -> Result<()>
where
    C: HttpClient,
    S: SessionStore,
{
    let conversations = api.list_conversations().await.map_err(api_failure)?;
    if conversations.is_empty() {
        writeln!(out, "No conversations")?;
    }
    for conversation in &conversations {
        writeln!(out, "{}\t{}", conversation.id, conversation.title)?;
    }
    Ok(())
}

/// Send a message and write the reply to `out` as it streams in.
///
/// Returns the final chat state. A stream that ends with an `error` event
/// or a transport failure is an error.
pub async fn handle_chat<C, S>(
    api: &ApiClient<C, S>,
    conversation: Option<&str>,
    message: &str,
    out: &mut impl Write,
) -> Result<ChatState>
where
    C: HttpClient,
    S: SessionStore,
{
    let (mut state, conversation_id, request) = match conversation {
        Some(id) => {
            let existing = api
                .get_conversation(id)
                .await
                .wrap_err_with(|| format!("could not load conversation {}", id))?;
            let mut state = ChatState::with_conversations(vec![existing]);
            state.set_current(Some(id.to_string()));
            (state, id.to_string(), ChatRequest::new(message).in_conversation(id))
        }
        None => {
            let mut state = ChatState::new();
            let id = state.create_conversation().id.clone();
            (state, id, ChatRequest::new(message))
        }
    };

    state.add_message(&conversation_id, Message::user(Uuid::new_v4().to_string(), message))?;
    state.set_loading(true);

    let mut events = api
        .send_message_stream(&request)
        .await
        .map_err(api_failure)?;
    let mut count = 0usize;

    while let Some(item) = events.next().await {
        let event = item?;
        count += 1;
        if event.kind() == ChatEventKind::Content {
            if let Some(fragment) = &event.content {
                write!(out, "{}", fragment)?;
                out.flush()?;
            }
        }
        state = state.apply_event(&conversation_id, &event);
    }
    writeln!(out)?;
    info!(events = count, "chat stream ended");

    if state.is_loading() {
        warn!("stream ended without a done event");
        state.set_loading(false);
    }

    let failure = state
        .conversation(&conversation_id)
        .and_then(|c| c.messages.last())
        .and_then(|m| m.error.clone());
    match failure {
        Some(error) => Err(eyre!("the assistant reported an error: {}", error)),
        None => Ok(state),
    }
}

/// Render a markdown file to HTML.
pub fn handle_render(path: &Path, out: &mut impl Write) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("could not read {}", path.display()))?;
    out.write_all(render_markdown(&text).as_bytes())?;
    Ok(())
}
