use tracing::{debug, info};

use crate::models::User;
use crate::traits::{Session, SessionError, SessionStore};

/// The signed-in user, backed by a [`SessionStore`].
#[derive(Debug)]
pub struct AuthState<S> {
    user: Option<User>,
    store: S,
}

impl<S: SessionStore> AuthState<S> {
    /// Signed-out state; call [`AuthState::check_auth`] to restore a session.
    pub fn new(store: S) -> Self {
        Self { user: None, store }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Set the user and persist it, keeping any stored token.
    pub async fn login(&mut self, user: User) -> Result<(), SessionError> {
        let token = self.store.token().await?;
        self.login_with_token(token, user).await
    }

    /// Set the user and persist it together with a fresh token.
    pub async fn login_with_token(
        &mut self,
        token: Option<String>,
        user: User,
    ) -> Result<(), SessionError> {
        self.store
            .save(&Session::new(token, Some(user.clone())))
            .await?;
        info!(username = %user.username, "logged in");
        self.user = Some(user);
        Ok(())
    }

    /// Forget the user and wipe the stored session.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.user = None;
        self.store.clear().await?;
        info!("logged out");
        Ok(())
    }

    /// Restore the user from storage. Returns whether one was found.
    pub async fn check_auth(&mut self) -> Result<bool, SessionError> {
        if let Some(user) = self.store.load().await?.and_then(|s| s.user) {
            debug!(username = %user.username, "restored session");
            self.user = Some(user);
        }
        Ok(self.is_authenticated())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
