//! Client for the chat backend's REST and streaming endpoints.

mod client;

pub use client::ApiClient;
