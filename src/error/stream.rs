//! Errors raised while consuming an event stream.

use thiserror::Error;

use crate::sse::DecodeError;
use crate::traits::HttpError;

/// Fatal failure of a running event stream.
///
/// Malformed frames are not errors here; the decoder logs and skips them.
/// Any `StreamError` ends the stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// Reading the response body failed.
    #[error("stream transport failed: {0}")]
    Transport(#[from] HttpError),

    /// The decoder was driven after it was closed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl StreamError {
    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport(_) => "E_STREAM_TRANSPORT",
            StreamError::Decode(_) => "E_STREAM_DECODE",
        }
    }
}
