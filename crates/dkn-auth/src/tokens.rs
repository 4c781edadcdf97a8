//! Access/refresh token pair issued at login.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "jwt")]
use chrono::{DateTime, Duration, Utc};

#[cfg(feature = "jwt")]
use crate::jwt::decode_unverified;

/// Tokens returned by `POST /auth/login/`.
///
/// A refresh only replaces `access`; the refresh token stays the same for
/// the life of the session.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    /// Access token (short-lived), sent as `Authorization: Bearer ...`
    pub access: String,

    /// Refresh token (long-lived)
    pub refresh: String,
}

impl TokenPair {
    /// Create a new token pair.
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    /// Expiry of the access token, read from its `exp` claim.
    ///
    /// `None` when the token is not a JWT or carries no `exp`.
    #[cfg(feature = "jwt")]
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        access_expires_at(&self.access)
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Expiry of an access token, read from its `exp` claim.
#[cfg(feature = "jwt")]
pub fn access_expires_at(access: &str) -> Option<DateTime<Utc>> {
    decode_unverified(access).ok().and_then(|claims| claims.expires_at())
}

/// Check if an access token is expired or expires within `leeway`.
///
/// Unreadable tokens are not considered expired; the server decides.
#[cfg(feature = "jwt")]
pub fn access_expired(access: &str, leeway: Duration) -> bool {
    match access_expires_at(access) {
        Some(expires_at) => expires_at <= Utc::now() + leeway,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair() {
        let pair = TokenPair::new("access", "refresh");
        assert_eq!(pair.access, "access");
        assert_eq!(pair.refresh, "refresh");
    }

    #[test]
    fn test_debug_redacts() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let printed = format!("{:?}", pair);
        assert!(!printed.contains("secret"));
    }

    #[cfg(feature = "jwt")]
    #[test]
    fn test_opaque_tokens_have_no_expiry() {
        let pair = TokenPair::new("opaque", "refresh");
        assert!(pair.access_expires_at().is_none());
        assert!(!access_expired("opaque", Duration::seconds(30)));
    }

    #[cfg(feature = "jwt")]
    #[test]
    fn test_expired_jwt() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let past = (Utc::now() - Duration::minutes(5)).timestamp();
        let token = encode(
            &Header::default(),
            &serde_json::json!({"exp": past, "token_type": "access"}),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let pair = TokenPair::new(token.clone(), "refresh");
        assert_eq!(pair.access_expires_at().map(|t| t.timestamp()), Some(past));
        assert!(access_expired(&token, Duration::zero()));
    }
}
