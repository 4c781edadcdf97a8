//! Session persistence backends.
//!
//! [`SessionStore`] abstracts where a [`SessionSnapshot`] lives between
//! runs: [`MemorySessionStore`] for tests and short-lived processes,
//! [`FileSessionStore`] for a JSON file on disk.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::AuthResult;
use crate::session::SessionSnapshot;

/// Where session state is persisted.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the saved state, or an empty snapshot if nothing is saved.
    async fn load(&self) -> AuthResult<SessionSnapshot>;

    /// Persist the state.
    async fn save(&self, snapshot: &SessionSnapshot) -> AuthResult<()>;

    /// Remove any saved state.
    async fn clear(&self) -> AuthResult<()>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    snapshot: Mutex<SessionSnapshot>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> AuthResult<SessionSnapshot> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> AuthResult<()> {
        *self.snapshot.lock().await = snapshot.clone();
        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        *self.snapshot.lock().await = SessionSnapshot::default();
        Ok(())
    }
}

/// JSON file store.
///
/// A missing file is an empty session. Entries that fail to parse are
/// treated as absent: an unreadable file starts empty, and an unreadable
/// `user` drops only the user.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the session is stored in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, contents: &str) -> SessionSnapshot {
        let value: serde_json::Value = match serde_json::from_str(contents) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                return SessionSnapshot::default();
            }
        };

        let text = |key: &str| value.get(key).and_then(|v| v.as_str()).map(str::to_string);
        let user = match value.get("user") {
            None | Some(serde_json::Value::Null) => None,
            Some(raw) => match serde_json::from_value(raw.clone()) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable stored user");
                    None
                }
            },
        };

        SessionSnapshot {
            access: text("access"),
            refresh: text("refresh"),
            user,
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> AuthResult<SessionSnapshot> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(self.parse(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved session");
                Ok(SessionSnapshot::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
