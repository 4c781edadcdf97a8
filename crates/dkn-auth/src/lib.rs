//! # DKN Authentication
//!
//! Explicit session handling for the DKN client. There is no global auth
//! state: a [`Session`] handle is created once and passed to every service
//! that needs it.
//!
//! ## Overview
//!
//! The dkn-auth crate handles:
//! - **Session**: access token, refresh token and current user behind one
//!   shared handle with an explicit login / refresh / logout lifecycle
//! - **Persistence**: pluggable [`SessionStore`] (memory, JSON file)
//! - **Tokens**: the login [`TokenPair`] and access-token expiry inspection
//!
//! The HTTP side of login and refresh lives in `dkn-client`; this crate only
//! owns the state those calls update.
//!
//! ## Features
//!
//! - `jwt` (default): read access-token claims using jsonwebtoken
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dkn_auth::{FileSessionStore, Session, TokenPair};
//!
//! # async fn run() -> dkn_auth::AuthResult<()> {
//! let store = Arc::new(FileSessionStore::new("/tmp/dkn-session.json"));
//! let session = Session::load(store).await?;
//!
//! if !session.is_authenticated().await {
//!     session.establish(TokenPair::new("access", "refresh")).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
#[cfg(feature = "jwt")]
pub mod jwt;
pub mod session;
pub mod store;
pub mod tokens;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use session::{Session, SessionSnapshot};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use tokens::TokenPair;

#[cfg(feature = "jwt")]
pub use jwt::{decode_unverified, AccessClaims};
#[cfg(feature = "jwt")]
pub use tokens::{access_expired, access_expires_at};
