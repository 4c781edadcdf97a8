//! JWT access-token inspection
//!
//! The API issues signed JWTs. The client never holds the signing key, so it
//! only reads the claims it needs (expiry, token type) to decide when to
//! refresh. Signature, audience and issuer are verified by the server on
//! every request.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Claims the client reads from an access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<i64>,

    /// "access" or "refresh"
    #[serde(default)]
    pub token_type: Option<String>,

    /// JWT ID
    #[serde(default)]
    pub jti: Option<String>,
}

impl AccessClaims {
    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Check if the token is expired at `now`, treating tokens that expire
    /// within `leeway` as already expired. Tokens without `exp` never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at <= now + leeway,
            None => false,
        }
    }
}

/// Decode the claims of a JWT without verifying its signature.
///
/// # Arguments
///
/// * `token` - The JWT token string
///
/// # Returns
///
/// Decoded claims, or [`AuthError::InvalidToken`] when the token is not a
/// readable JWT
pub fn decode_unverified(token: &str) -> AuthResult<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data: TokenData<AccessClaims> = decode(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}
