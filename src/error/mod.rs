//! Error types for the chat client.
//!
//! | Type | Raised by | Fatal to |
//! |------|-----------|----------|
//! | [`ApiError`] | API calls (transport, non-2xx, body shape) | the call |
//! | [`StreamError`] | a running event stream | the stream |
//! | [`StoreError`] | state container transitions | nothing; the state is unchanged |
//!
//! Frame-level JSON errors never show up here: the decoder logs the frame
//! and keeps going.

mod api;
mod store;
mod stream;

pub use api::ApiError;
pub use store::StoreError;
pub use stream::StreamError;

/// Result alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
