//! `login`, `logout` and `whoami`.

use color_eyre::Result;
use std::io::Write;
use tracing::warn;

use super::api_failure;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::LoginRequest;
use crate::store::AuthState;
use crate::traits::{HttpClient, SessionStore};

/// Sign in and persist the token and user.
pub async fn handle_login<C, S>(
    api: &ApiClient<C, S>,
    username: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<()>
where
    C: HttpClient,
    S: SessionStore + Clone,
{
    let auth = api.login(&LoginRequest::new(username, password)).await?;

    let mut state = AuthState::new(api.session_store().clone());
    state.login_with_token(Some(auth.token), auth.user).await?;

    if let Some(user) = state.user() {
        writeln!(out, "Logged in as {}", user.username)?;
    }
    Ok(())
}

/// Tell the backend, then forget the local session even if that failed.
pub async fn handle_logout<C, S>(api: &ApiClient<C, S>, out: &mut impl Write) -> Result<()>
where
    C: HttpClient,
    S: SessionStore + Clone,
{
    if let Err(err) = api.logout().await {
        warn!(error = %err, "backend logout failed; clearing local session anyway");
    }

    AuthState::new(api.session_store().clone()).logout().await?;
    writeln!(out, "Logged out")?;
    Ok(())
}

/// Show the signed-in user as the backend sees it.
pub async fn handle_whoami<C, S>(api: &ApiClient<C, S>, out: &mut impl Write) -> Result<()>
where
    C: HttpClient,
    S: SessionStore + Clone,
{
    let mut state = AuthState::new(api.session_store().clone());
    if !state.check_auth().await? {
        writeln!(out, "Not logged in")?;
        return Ok(());
    }

    match api.current_user().await {
        Ok(user) => match user.email {
            Some(email) => writeln!(out, "{} <{}>", user.username, email)?,
            None => writeln!(out, "{}", user.username)?,
        },
        Err(ApiError::Unauthorized { .. }) => {
            writeln!(out, "Session expired. Please log in again.")?;
        }
        Err(err) => return Err(api_failure(err)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemorySessionStore, MockHttpClient, MockResponse};
    use crate::config::ClientConfig;
    use crate::models::User;
    use crate::traits::{HttpError, Session};
    use serde_json::json;

    fn api(
        http: &MockHttpClient,
        session: &InMemorySessionStore,
    ) -> ApiClient<MockHttpClient, InMemorySessionStore> {
        ApiClient::new(
            http.clone(),
            session.clone(),
            ClientConfig::default().with_base_url("http://test/api"),
        )
    }

    fn signed_in() -> InMemorySessionStore {
        InMemorySessionStore::with_session(Session::new(
            Some("tok".to_string()),
            Some(User::new("1", "ada")),
        ))
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::json(
            200,
            json!({"token": "fresh", "user": {"id": 1, "username": "ada"}}),
        ));
        let session = InMemorySessionStore::new();
        let mut out = Vec::new();

        handle_login(&api(&http, &session), "ada", "pw", &mut out)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Logged in as ada\n");
        let stored = session.session().unwrap();
        assert_eq!(stored.token.as_deref(), Some("fresh"));
        assert_eq!(stored.user.unwrap().username, "ada");
    }

    #[tokio::test]
    async fn test_login_failure_stores_nothing() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::json(400, json!({"detail": "bad password"})));
        let session = InMemorySessionStore::new();

        let result = handle_login(&api(&http, &session), "ada", "nope", &mut Vec::new()).await;
        assert!(result.is_err());
        assert!(session.session().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_unreachable() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::Error(HttpError::ConnectionFailed(
            "refused".to_string(),
        )));
        let session = signed_in();

        handle_logout(&api(&http, &session), &mut Vec::new())
            .await
            .unwrap();
        assert!(session.session().is_none());
    }

    #[tokio::test]
    async fn test_whoami_not_logged_in() {
        let http = MockHttpClient::new();
        let mut out = Vec::new();

        handle_whoami(&api(&http, &InMemorySessionStore::new()), &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Not logged in\n");
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_whoami_expired_session() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::json(401, json!({})));
        let session = signed_in();
        let mut out = Vec::new();

        handle_whoami(&api(&http, &session), &mut out).await.unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Session expired"));
        assert!(session.session().is_none());
    }

    #[tokio::test]
    async fn test_whoami_unreachable_backend() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::Error(HttpError::Timeout("30s".to_string())));

        let err = handle_whoami(&api(&http, &signed_in()), &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not reach the server. Please try again."
        );
    }

    #[tokio::test]
    async fn test_whoami_prints_user() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::json(
            200,
            json!({"id": 1, "username": "ada", "email": "ada@example.com"}),
        ));
        let mut out = Vec::new();

        handle_whoami(&api(&http, &signed_in()), &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ada <ada@example.com>\n");
    }
}
