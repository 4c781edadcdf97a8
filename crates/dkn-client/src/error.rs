//! Client error types
//!
//! Every failure a caller can see is a [`ClientError`]. Each one falls into
//! one of three buckets ([`ErrorKind`]): the server or the local gate refused
//! the action, the payload was invalid, or the request itself failed.
//! Callers show a generic per-action message (see
//! [`ResourceAction::failure_message`](dkn_knowledge::ResourceAction::failure_message))
//! whatever the bucket.

use thiserror::Error;

use dkn_auth::AuthError;
use dkn_knowledge::{ResourceId, TransitionError, ValidationError};

/// Broad class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The local gate or the server refused the action
    AuthorizationDenied,
    /// The request was malformed or refused on business rules
    Validation,
    /// Network failure, timeout or server fault
    Transient,
}

impl ErrorKind {
    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthorizationDenied => "authorization_denied",
            ErrorKind::Validation => "validation",
            ErrorKind::Transient => "transient",
        }
    }
}

/// Client error types.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// API returned an unexpected error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Body of the error response
        message: String,
    },

    /// Still 401 after refreshing the access token
    #[error("Authentication failed")]
    Unauthorized,

    /// The server refused the action (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The target does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The payload was rejected, locally or by the server (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The local Authorization Gate refused; nothing was sent
    #[error("Not permitted to {action}: {reason}")]
    NotPermitted {
        /// Action that was refused
        action: String,
        /// Why the gate refused
        reason: String,
    },

    /// Another mutation on the same resource has not settled yet
    #[error("An action on resource {resource_id} is already in progress")]
    Busy {
        /// Resource the pending mutation targets
        resource_id: ResourceId,
    },

    /// Response body did not have the expected shape
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Session or token failure
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Request(e)
        }
    }
}

impl From<ValidationError> for ClientError {
    fn from(e: ValidationError) -> Self {
        ClientError::Validation(e.to_string())
    }
}

impl From<TransitionError> for ClientError {
    fn from(e: TransitionError) -> Self {
        ClientError::NotPermitted {
            action: e.transition.action().to_string(),
            reason: e.to_string(),
        }
    }
}

impl ClientError {
    /// Build a [`ClientError::NotPermitted`].
    pub fn not_permitted(action: impl Into<String>, reason: impl Into<String>) -> Self {
        ClientError::NotPermitted {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Unauthorized
            | ClientError::Forbidden(_)
            | ClientError::NotPermitted { .. }
            | ClientError::Auth(_) => ErrorKind::AuthorizationDenied,

            ClientError::Validation(_) | ClientError::NotFound(_) | ClientError::Busy { .. } => {
                ErrorKind::Validation
            }

            ClientError::Api { status, .. } if (400..500).contains(status) && *status != 429 => {
                ErrorKind::Validation
            }

            ClientError::Request(_)
            | ClientError::Timeout
            | ClientError::Api { .. }
            | ClientError::InvalidResponse(_) => ErrorKind::Transient,
        }
    }

    /// Check if repeating the same request may succeed.
    ///
    /// Used as the retry predicate for reads only.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Request(_) | ClientError::Timeout => true,
            ClientError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Check if the user has to log in again.
    pub fn requires_login(&self) -> bool {
        match self {
            ClientError::Unauthorized => true,
            ClientError::Auth(e) => e.requires_login(),
            _ => false,
        }
    }

    /// Get the equivalent HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ClientError::Unauthorized => 401,
            ClientError::Forbidden(_) | ClientError::NotPermitted { .. } => 403,
            ClientError::NotFound(_) => 404,
            ClientError::Validation(_) => 400,
            ClientError::Busy { .. } => 409,
            ClientError::Timeout => 408,
            ClientError::Api { status, .. } => *status,
            ClientError::Auth(e) => e.status_code(),
            ClientError::Request(_) | ClientError::InvalidResponse(_) => 502,
        }
    }

    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Request(_) => "REQUEST_FAILED",
            ClientError::Timeout => "TIMEOUT",
            ClientError::Api { .. } => "API_ERROR",
            ClientError::Unauthorized => "UNAUTHORIZED",
            ClientError::Forbidden(_) => "FORBIDDEN",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::Validation(_) => "VALIDATION_FAILED",
            ClientError::NotPermitted { .. } => "NOT_PERMITTED",
            ClientError::Busy { .. } => "BUSY",
            ClientError::InvalidResponse(_) => "INVALID_RESPONSE",
            ClientError::Auth(e) => e.error_code(),
        }
    }
}
