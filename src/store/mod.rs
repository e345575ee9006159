//! Client-side state containers.
//!
//! [`AuthState`] tracks the signed-in user and mirrors it into a
//! [`crate::traits::SessionStore`]. [`ChatState`] owns the conversation list
//! and folds streamed [`crate::sse::ChatEvent`]s into it.

mod auth;
mod chat;

pub use auth::AuthState;
pub use chat::{ChatState, DEFAULT_TITLE, TITLE_PREFIX_CHARS};
