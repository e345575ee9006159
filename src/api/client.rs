//! API client for the chat backend.
//!
//! Every request carries `Content-Type: application/json` and, when a token
//! is stored, `Authorization: Bearer <token>`. A 2xx body is parsed as JSON.
//! A 401 clears the stored session before the error is returned.

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::adapters::{FileSessionStore, ReqwestHttpClient};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AuthResponse, ChatRequest, Conversation, ConversationList, LoginRequest, RegisterRequest, User,
};
use crate::sse::{decode_events, ChatEvent, EventStream};
use crate::traits::{Headers, HttpClient, HttpError, Method, Request, SessionStore};

/// Client for the auth, conversation and chat endpoints.
///
/// Generic over the transport and the session store so tests can use the
/// mocks in [`crate::adapters::mock`].
#[derive(Debug, Clone)]
pub struct ApiClient<C = ReqwestHttpClient, S = FileSessionStore> {
    http: C,
    session: S,
    config: ClientConfig,
}

impl ApiClient {
    /// Production client: reqwest transport and the configured session file.
    pub fn from_config(config: ClientConfig) -> ApiResult<Self> {
        let session = match &config.session_path {
            Some(path) => FileSessionStore::new(path.clone()),
            None => FileSessionStore::default_location()?,
        };
        Ok(Self::new(ReqwestHttpClient::new(), session, config))
    }
}

impl<C: HttpClient, S: SessionStore> ApiClient<C, S> {
    pub fn new(http: C, session: S, config: ClientConfig) -> Self {
        Self {
            http,
            session,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session_store(&self) -> &S {
        &self.session
    }

    // ---- auth ----

    /// `POST /auth/login`
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<AuthResponse> {
        self.post_json("/auth/login", credentials).await
    }

    /// `POST /auth/register`
    pub async fn register(&self, user: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.post_json("/auth/register", user).await
    }

    /// `POST /auth/logout`
    pub async fn logout(&self) -> ApiResult<()> {
        let request = self.request(Method::Post, "/auth/logout").await?;
        self.execute::<serde_json::Value>(request).await.map(|_| ())
    }

    /// `GET /auth/me`
    pub async fn current_user(&self) -> ApiResult<User> {
        let request = self.request(Method::Get, "/auth/me").await?;
        self.execute(request).await
    }

    // ---- conversations ----

    /// `GET /conversations`
    pub async fn list_conversations(&self) -> ApiResult<Vec<Conversation>> {
        let request = self.request(Method::Get, "/conversations").await?;
        let list: ConversationList = self.execute(request).await?;
        Ok(list.into_vec())
    }

    /// `POST /conversations` with `{ "title": ... }`
    pub async fn create_conversation(&self, title: &str) -> ApiResult<Conversation> {
        self.post_json("/conversations", &serde_json::json!({ "title": title }))
            .await
    }

    /// `GET /conversations/{id}`
    pub async fn get_conversation(&self, id: &str) -> ApiResult<Conversation> {
        let request = self
            .request(Method::Get, &conversation_path(id))
            .await?;
        self.execute(request).await
    }

    /// `DELETE /conversations/{id}`
    pub async fn delete_conversation(&self, id: &str) -> ApiResult<()> {
        let request = self
            .request(Method::Delete, &conversation_path(id))
            .await?;
        self.execute::<serde_json::Value>(request).await.map(|_| ())
    }

    // ---- chat ----

    /// `POST /chat`, buffered reply.
    pub async fn send_message(&self, chat: &ChatRequest) -> ApiResult<serde_json::Value> {
        self.post_json("/chat", chat).await
    }

    /// `POST /chat/stream`, reply as a stream of [`ChatEvent`]s.
    ///
    /// A non-2xx status fails here, before any decoding. The request has no
    /// timeout; drop the stream to cancel it.
    pub async fn send_message_stream(&self, chat: &ChatRequest) -> ApiResult<EventStream<ChatEvent>> {
        let request = self
            .request(Method::Post, "/chat/stream")
            .await?
            .with_body(serde_json::to_string(chat)?)
            .with_timeout(None);

        info!(conversation_id = ?chat.conversation_id, "starting chat stream");

        let chunks = match self.http.send_stream(request).await {
            Ok(chunks) => chunks,
            Err(HttpError::Status { status, message }) => {
                return Err(self.reject(status, message).await);
            }
            Err(err) => {
                error!(error = %err, "chat stream request failed");
                return Err(ApiError::Transport(err));
            }
        };

        let events = decode_events::<ChatEvent, _>(chunks).inspect(|item| {
            if let Ok(event) = item {
                debug!(
                    event_type = %event.event_type,
                    content_len = event.content_len(),
                    "received chat event"
                );
            }
        });

        Ok(Box::pin(events))
    }

    // ---- plumbing ----

    async fn headers(&self) -> ApiResult<Headers> {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if let Some(token) = self.session.token().await? {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        Ok(headers)
    }

    async fn request(&self, method: Method, path: &str) -> ApiResult<Request> {
        Ok(Request::new(method, self.config.endpoint(path))
            .with_headers(self.headers().await?)
            .with_timeout(Some(self.config.timeout)))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::Post, path)
            .await?
            .with_body(serde_json::to_string(body)?);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request) -> ApiResult<T> {
        let method = request.method;
        let url = request.url.clone();

        let response = match self.http.send(request).await {
            Ok(response) => response,
            Err(err) => {
                error!(%method, %url, error = %err, "request failed");
                return Err(err.into());
            }
        };

        if !response.is_success() {
            return Err(self.reject(response.status, response.text()).await);
        }

        debug!(%method, %url, status = response.status, "request succeeded");
        parse_body(&response.body)
    }

    /// Turn a non-2xx status into an error, clearing the session on 401.
    async fn reject(&self, status: u16, message: String) -> ApiError {
        let err = ApiError::from_status(status, message);
        if matches!(err, ApiError::Unauthorized { .. }) {
            warn!("backend answered 401; clearing stored session");
            if let Err(clear_err) = self.session.clear().await {
                error!(error = %clear_err, "failed to clear session after 401");
            }
        } else {
            warn!(status, "backend returned an error status");
        }
        err
    }
}

fn conversation_path(id: &str) -> String {
    format!("/conversations/{}", urlencoding::encode(id))
}

/// Parse a JSON body; an empty body reads as `null`.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        Ok(serde_json::from_str("null")?)
    } else {
        Ok(serde_json::from_slice(body)?)
    }
}
