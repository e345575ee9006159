//! In-memory session store for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::{Session, SessionError, SessionStore};

/// [`SessionStore`] kept in memory, with switchable failures.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    session: Arc<Mutex<Option<Session>>>,
    fail_saves: Arc<Mutex<bool>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        let store = Self::new();
        store.set_session(Some(session));
        store
    }

    /// A store holding only a bearer token.
    pub fn with_token(token: &str) -> Self {
        Self::with_session(Session::new(Some(token.to_string()), None))
    }

    /// Current contents, read synchronously.
    pub fn session(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }

    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock().unwrap_or_else(PoisonError::into_inner) = fail;
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.session())
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        if *self.fail_saves.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(SessionError::SaveFailed("Mock save failure".to_string()));
        }
        self.set_session(Some(session.clone()));
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.set_session(None);
        Ok(())
    }
}
