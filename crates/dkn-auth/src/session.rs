//! # Session context
//!
//! [`Session`] is the explicit replacement for a process-wide auth store:
//! a cheap, cloneable handle owned by whoever builds the client and passed
//! to it. It holds the access token, the refresh token and the current
//! user, and persists every change through a [`SessionStore`].
//!
//! ## Lifecycle
//!
//! ```text
//! login ──▶ establish(tokens) ──▶ set_user(profile)
//!             │
//!             ├─ 401 ──▶ update_access_token(new access)   (refresh)
//!             └─ refresh failed / logout ──▶ clear()
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use dkn_rbac::User;

use crate::error::AuthResult;
use crate::store::{MemorySessionStore, SessionStore};
use crate::tokens::TokenPair;

/// Everything a session holds, as persisted by a [`SessionStore`].
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,

    /// Refresh token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,

    /// Current user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl SessionSnapshot {
    /// Check if an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.access.is_some()
    }
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("access", &self.access.as_ref().map(|_| "[REDACTED]"))
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

/// Shared, explicitly passed session handle.
///
/// Cloning the handle shares the same underlying state.
///
/// # Examples
///
/// ```
/// use dkn_auth::{Session, TokenPair};
/// use dkn_rbac::{Role, User};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let session = Session::in_memory();
/// session.establish(TokenPair::new("a", "r")).await.unwrap();
/// session.set_user(User::new(1, "dana", Role::Employee)).await.unwrap();
///
/// assert!(session.is_authenticated().await);
/// session.clear().await.unwrap();
/// assert!(session.user().await.is_none());
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionSnapshot>>,
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// A session kept only in memory.
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionSnapshot::default())),
            store: Arc::new(MemorySessionStore::new()),
        }
    }

    /// Restore a session from `store`, starting empty if nothing is saved.
    pub async fn load(store: Arc<dyn SessionStore>) -> AuthResult<Self> {
        let snapshot = store.load().await?;
        debug!(authenticated = snapshot.is_authenticated(), "Session restored");

        Ok(Self {
            state: Arc::new(RwLock::new(snapshot)),
            store,
        })
    }

    /// Store a fresh token pair after login. Any previous user is dropped
    /// until [`set_user`](Self::set_user) is called.
    pub async fn establish(&self, tokens: TokenPair) -> AuthResult<()> {
        let mut state = self.state.write().await;
        *state = SessionSnapshot {
            access: Some(tokens.access),
            refresh: Some(tokens.refresh),
            user: None,
        };
        self.store.save(&state).await?;
        info!("Session established");
        Ok(())
    }

    /// Record the profile of the logged-in user.
    pub async fn set_user(&self, user: User) -> AuthResult<()> {
        let mut state = self.state.write().await;
        debug!(user_id = user.id, role = %user.role, "Session user set");
        state.user = Some(user);
        self.store.save(&state).await
    }

    /// Replace the access token after a refresh; the refresh token is kept.
    pub async fn update_access_token(&self, access: impl Into<String>) -> AuthResult<()> {
        let mut state = self.state.write().await;
        state.access = Some(access.into());
        self.store.save(&state).await?;
        debug!("Access token updated");
        Ok(())
    }

    /// Forget tokens and user (logout, or refresh failure).
    pub async fn clear(&self) -> AuthResult<()> {
        let mut state = self.state.write().await;
        *state = SessionSnapshot::default();
        self.store.clear().await?;
        info!("Session cleared");
        Ok(())
    }

    /// True iff an access token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// Current user, if the profile has been loaded.
    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Current access token.
    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access.clone()
    }

    /// Current refresh token.
    pub async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.refresh.clone()
    }

    /// Both tokens, when both are held.
    pub async fn tokens(&self) -> Option<TokenPair> {
        let state = self.state.read().await;
        match (&state.access, &state.refresh) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access.clone(), refresh.clone())),
            _ => None,
        }
    }

    /// Copy of the full state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dkn_rbac::Role;

    #[tokio::test]
    async fn test_establish_and_user() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated().await);

        session.establish(TokenPair::new("access-1", "refresh-1")).await.unwrap();
        assert!(session.is_authenticated().await);
        assert!(session.user().await.is_none());

        session.set_user(User::new(4, "dana", Role::Employee)).await.unwrap();
        assert_eq!(session.user().await.map(|u| u.id), Some(4));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token() {
        let session = Session::in_memory();
        session.establish(TokenPair::new("access-1", "refresh-1")).await.unwrap();
        session.update_access_token("access-2").await.unwrap();

        let tokens = session.tokens().await.unwrap();
        assert_eq!(tokens.access, "access-2");
        assert_eq!(tokens.refresh, "refresh-1");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let session = Session::in_memory();
        let other = session.clone();

        session.establish(TokenPair::new("a", "r")).await.unwrap();
        assert!(other.is_authenticated().await);

        other.clear().await.unwrap();
        assert!(!session.is_authenticated().await);
        assert!(session.refresh_token().await.is_none());
    }

    #[tokio::test]
    async fn test_load_from_store() {
        let store = Arc::new(MemorySessionStore::new());
        let first = Session::load(store.clone()).await.unwrap();
        first.establish(TokenPair::new("a", "r")).await.unwrap();
        first.set_user(User::new(1, "cleo", Role::Council)).await.unwrap();

        let restored = Session::load(store).await.unwrap();
        assert_eq!(restored.access_token().await.as_deref(), Some("a"));
        assert_eq!(restored.user().await.map(|u| u.role), Some(Role::Council));
    }

    #[test]
    fn test_snapshot_debug_redacts_tokens() {
        let snapshot = SessionSnapshot {
            access: Some("top-secret".into()),
            refresh: Some("top-secret".into()),
            user: None,
        };
        assert!(!format!("{:?}", snapshot).contains("top-secret"));
    }
}
