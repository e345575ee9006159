//! chatstream - a command-line client for a streaming chat backend
//!
//! The core is [`sse::EventDecoder`], an incremental decoder for the
//! line-framed `data: {json}` event stream returned by `/chat/stream`.
//! Around it sit the HTTP API client, session storage, the chat state
//! reducer and a markdown renderer for message bodies.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod sse;
pub mod store;
pub mod traits;
