//! Errors surfaced by the API client.

use thiserror::Error;

use crate::traits::{HttpError, SessionError};

/// Failure of a single API call.
///
/// No call is retried by the client; [`ApiError::is_retryable`] lets the
/// caller decide.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(HttpError),

    /// The backend answered 401; the stored session has been cleared.
    #[error("not authenticated: {message}")]
    Unauthorized { message: String },

    /// Any other non-2xx status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, message: String },

    /// A 2xx body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or clearing the stored session failed.
    #[error("session storage: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Map a non-2xx status to the matching variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Status { status, message }
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(HttpError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Check if repeating the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(err) => matches!(
                err,
                HttpError::ConnectionFailed(_) | HttpError::Timeout(_) | HttpError::Io(_)
            ),
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Short text suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "Could not reach the server. Please try again.".to_string(),
            ApiError::Unauthorized { .. } => "Your session has expired. Please log in again.".to_string(),
            ApiError::Status { status, message } if !message.is_empty() => {
                format!("Server error ({}): {}", status, message)
            }
            ApiError::Status { status, .. } => format!("Server error ({})", status),
            ApiError::Json(_) => "Received an unexpected response from the server.".to_string(),
            ApiError::Session(err) => err.to_string(),
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, message } => ApiError::from_status(status, message),
            other => ApiError::Transport(other),
        }
    }
}
