//! Session storage trait abstraction.
//!
//! A [`Session`] is the bearer token plus the signed-in user. The API client
//! reads the token from a [`SessionStore`] and clears the store when the
//! backend answers 401.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Persisted authentication state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Bearer token sent as `Authorization: Bearer <token>`
    #[serde(default)]
    pub token: Option<String>,
    /// The signed-in user
    #[serde(default)]
    pub user: Option<User>,
}

impl Session {
    pub fn new(token: Option<String>, user: Option<User>) -> Self {
        Self { token, user }
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

/// Session storage errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Failed to load the session
    LoadFailed(String),
    /// Failed to save the session
    SaveFailed(String),
    /// Failed to clear the session
    ClearFailed(String),
    /// Stored data could not be (de)serialized
    Serialization(String),
    /// No location to store the session
    NoLocation,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::LoadFailed(msg) => write!(f, "Failed to load session: {}", msg),
            SessionError::SaveFailed(msg) => write!(f, "Failed to save session: {}", msg),
            SessionError::ClearFailed(msg) => write!(f, "Failed to clear session: {}", msg),
            SessionError::Serialization(msg) => write!(f, "Session serialization error: {}", msg),
            SessionError::NoLocation => write!(f, "Could not determine a session storage location"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Storage for the current [`Session`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session; `Ok(None)` when nothing is stored.
    async fn load(&self) -> Result<Option<Session>, SessionError>;

    /// Replace the stored session.
    async fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove the token and user.
    async fn clear(&self) -> Result<(), SessionError>;

    /// The stored bearer token, if any.
    async fn token(&self) -> Result<Option<String>, SessionError> {
        Ok(self.load().await?.and_then(|session| session.token))
    }
}
