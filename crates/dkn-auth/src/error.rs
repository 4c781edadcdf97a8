//! Error types for session and token operations
//!
//! This module defines the errors that can occur while establishing,
//! refreshing, persisting or inspecting a session.

use thiserror::Error;

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No access token is held
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A refresh was needed but no refresh token is held
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The server refused the refresh token
    #[error("Token refresh rejected: {0}")]
    RefreshRejected(String),

    /// Token is malformed or its claims are unreadable
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Login refused
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Reading or writing the session store failed
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Expired sessions and bad credentials are expected and are not.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Storage(_) | AuthError::Internal(_))
    }

    /// Check if the session is unusable and the user must log in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated
                | AuthError::NoRefreshToken
                | AuthError::RefreshRejected(_)
                | AuthError::InvalidCredentials
        )
    }

    /// Get the equivalent HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::NotAuthenticated
            | AuthError::NoRefreshToken
            | AuthError::RefreshRejected(_)
            | AuthError::InvalidToken(_)
            | AuthError::InvalidCredentials => 401,

            AuthError::Storage(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "NOT_AUTHENTICATED",
            AuthError::NoRefreshToken => "NO_REFRESH_TOKEN",
            AuthError::RefreshRejected(_) => "REFRESH_REJECTED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Storage(_) => "STORAGE_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::NotAuthenticated.status_code(), 401);
        assert_eq!(AuthError::RefreshRejected("expired".into()).status_code(), 401);
        assert_eq!(AuthError::Storage("disk full".into()).status_code(), 500);
    }

    #[test]
    fn test_requires_login() {
        assert!(AuthError::NoRefreshToken.requires_login());
        assert!(AuthError::RefreshRejected("x".into()).requires_login());
        assert!(!AuthError::Storage("x".into()).requires_login());
        assert!(AuthError::Storage("x".into()).is_server_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::InvalidCredentials.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(AuthError::InvalidToken("bad".into()).to_string(), "Invalid token: bad");
    }
}
