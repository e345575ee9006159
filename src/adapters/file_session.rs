//! File-based session store.
//!
//! The session is kept as pretty-printed JSON, by default at
//! `~/.chatstream/session.json`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::default_session_path;
use crate::traits::{Session, SessionError, SessionStore};

/// [`SessionStore`] persisting to a single JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the home directory.
    pub fn default_location() -> Result<Self, SessionError> {
        default_session_path()
            .map(Self::new)
            .ok_or(SessionError::NoLocation)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>, SessionError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SessionError::LoadFailed(err.to_string())),
        };

        let session: Session = serde_json::from_slice(&raw)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;

        if session.is_empty() {
            Ok(None)
        } else {
            Ok(Some(session))
        }
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::SaveFailed(e.to_string()))?;
        }

        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| SessionError::SaveFailed(e.to_string()))?;

        // The file holds a bearer token: owner read/write only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| SessionError::SaveFailed(e.to_string()))?;
        }

        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionError::ClearFailed(err.to_string())),
        }
    }
}
