//! Client configuration.
//!
//! Defaults point at a backend on `localhost:8088` serving under `/api`,
//! with a 30 second timeout for ordinary requests. Streaming requests are
//! not subject to the timeout.

use std::path::PathBuf;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8088/api";

/// Default timeout for non-streaming requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_BASE_URL: &str = "CHATSTREAM_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CHATSTREAM_TIMEOUT_SECS";
pub const ENV_SESSION_FILE: &str = "CHATSTREAM_SESSION_FILE";

const SESSION_DIR: &str = ".chatstream";
const SESSION_FILE: &str = "session.json";

/// `~/.chatstream/session.json`, or `None` without a home directory.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SESSION_DIR).join(SESSION_FILE))
}

/// Settings for [`crate::api::ApiClient`].
///
/// # Example
///
/// ```
/// use chatstream::config::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_base_url("https://chat.example.com/api/")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(config.endpoint("/chat/stream"), "https://chat.example.com/api/chat/stream");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Timeout for non-streaming requests
    pub timeout: Duration,
    /// Where the session is persisted (`None` without a home directory)
    pub session_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            session_path: default_session_path(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `CHATSTREAM_*` environment variables.
    ///
    /// Unparseable or zero timeouts are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }
        if let Some(path) = lookup(ENV_SESSION_FILE).filter(|v| !v.trim().is_empty()) {
            config.session_path = Some(PathBuf::from(path));
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Full URL for an endpoint path such as `/conversations`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
