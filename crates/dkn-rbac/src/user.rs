//! The authenticated principal.

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Server-assigned user identifier.
pub type UserId = i64;

/// A DKN user as returned by the profile endpoint.
///
/// # Examples
///
/// ```
/// use dkn_rbac::{Role, User};
///
/// let user = User::new(7, "amira", Role::Champion);
/// assert!(user.role.is_reviewer());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// User ID
    pub id: UserId,

    /// Login name
    pub username: String,

    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Platform role
    pub role: Role,

    /// Home region (e.g. "EU", "GLOBAL")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl User {
    /// Creates a user with no email or region.
    pub fn new(id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            email: None,
            role,
            region: None,
        }
    }

    /// Set the user's region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}
