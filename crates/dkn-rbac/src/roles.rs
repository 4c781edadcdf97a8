//! Platform roles
//!
//! Every DKN account carries exactly one role. Roles are not hierarchical:
//! a Council member is a reviewer and publisher but cannot upload, and an
//! Employee uploads but never reviews. What each role may do is defined by
//! the capability table in [`crate::gate`].

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::permissions::{Permission, PermissionSet};
use crate::subjects::Subject;

/// Role assigned to a DKN user account.
///
/// # Examples
///
/// ```
/// use dkn_rbac::Role;
///
/// assert!(Role::Council.is_reviewer());
/// assert!(!Role::Employee.is_reviewer());
/// assert_eq!(Role::parse("officer"), Some(Role::Officer));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Uploads knowledge resources and takes training.
    Employee,

    /// First review tier; also authors training courses.
    Champion,

    /// Regional officer review tier.
    Officer,

    /// Governance council: final review tier and the only publisher.
    Council,
}

impl Role {
    /// Check if this role takes part in the review pipeline.
    ///
    /// # Returns
    ///
    /// `true` for Champion, Officer and Council
    pub fn is_reviewer(&self) -> bool {
        matches!(self, Role::Champion | Role::Officer | Role::Council)
    }

    /// The permissions this role holds regardless of ownership.
    ///
    /// Ownership-scoped grants (project lead, course creator, post author,
    /// resource uploader) are layered on top by [`crate::AccessGate`].
    pub fn default_permissions(&self) -> PermissionSet {
        let mut set = PermissionSet::new();

        // Everyone can browse published knowledge and the leaderboards.
        set.add(Permission::new(Subject::Resource, Action::Read));
        set.add(Permission::new(Subject::Resource, Action::List));
        set.add(Permission::new(Subject::Course, Action::List));
        set.add(Permission::new(Subject::Leaderboard, Action::Read));

        match self {
            Role::Employee => {
                set.add(Permission::new(Subject::Resource, Action::Upload));
                set.add(Permission::new(Subject::Resource, Action::Submit));
                set.add(Permission::new(Subject::Resource, Action::Delete));
                set.add(Permission::new(Subject::Project, Action::Create));
                set.add(Permission::new(Subject::Project, Action::List));
                set.add(Permission::new(Subject::Quiz, Action::Take));
            }
            Role::Champion => {
                set.add(Permission::new(Subject::Review, Action::Decide));
                set.add(Permission::new(Subject::ReviewQueue, Action::List));
                set.add(Permission::new(Subject::Project, Action::Create));
                set.add(Permission::new(Subject::Project, Action::List));
                set.add(Permission::new(Subject::Course, Action::Create));
                set.add(Permission::new(Subject::Course, Action::Manage));
                set.add(Permission::new(Subject::Quiz, Action::Manage));
            }
            Role::Officer => {
                set.add(Permission::new(Subject::Review, Action::Decide));
                set.add(Permission::new(Subject::ReviewQueue, Action::List));
            }
            Role::Council => {
                set.add(Permission::new(Subject::Review, Action::Decide));
                set.add(Permission::new(Subject::ReviewQueue, Action::List));
                set.add(Permission::new(Subject::Resource, Action::Publish));
                set.add(Permission::new(Subject::Resource, Action::Unpublish));
            }
        }

        set
    }

    /// Parse role from string representation (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use dkn_rbac::Role;
    ///
    /// assert_eq!(Role::parse("COUNCIL"), Some(Role::Council));
    /// assert_eq!(Role::parse("admin"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EMPLOYEE" => Some(Self::Employee),
            "CHAMPION" => Some(Self::Champion),
            "OFFICER" => Some(Self::Officer),
            "COUNCIL" => Some(Self::Council),
            _ => None,
        }
    }

    /// Wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "EMPLOYEE",
            Self::Champion => "CHAMPION",
            Self::Officer => "OFFICER",
            Self::Council => "COUNCIL",
        }
    }

    /// Human-readable name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Champion => "Knowledge Champion",
            Self::Officer => "Regional Officer",
            Self::Council => "Governance Council",
        }
    }

    /// All roles.
    pub fn all() -> [Role; 4] {
        [Role::Employee, Role::Champion, Role::Officer, Role::Council]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("employee"), Some(Role::Employee));
        assert_eq!(Role::parse("Champion"), Some(Role::Champion));
        assert_eq!(Role::parse("OFFICER"), Some(Role::Officer));
        assert_eq!(Role::parse("council"), Some(Role::Council));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::Council.to_string(), "COUNCIL");
        for role in Role::all() {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_reviewers() {
        assert!(!Role::Employee.is_reviewer());
        assert!(Role::Champion.is_reviewer());
        assert!(Role::Officer.is_reviewer());
        assert!(Role::Council.is_reviewer());
    }

    #[test]
    fn test_only_council_publishes() {
        for role in Role::all() {
            let perms = role.default_permissions();
            let publishes = perms.has(&Permission::new(Subject::Resource, Action::Publish));
            assert_eq!(publishes, role == Role::Council, "{role}");
        }
    }

    #[test]
    fn test_only_employee_uploads() {
        for role in Role::all() {
            let perms = role.default_permissions();
            let uploads = perms.has(&Permission::new(Subject::Resource, Action::Upload));
            assert_eq!(uploads, role == Role::Employee, "{role}");
        }
    }
}
