//! # Permissions
//!
//! A permission combines a subject with an action, optionally scoped to a
//! single item (a specific project, course, resource ...).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::actions::Action;
use crate::subjects::Subject;

/// A permission is a combination of subject and action.
///
/// Permissions can be:
/// - **Global**: apply to every item of the subject (no `scope_id`)
/// - **Scoped**: apply only to one item (with `scope_id`)
///
/// # Example
///
/// ```
/// use dkn_rbac::{Action, Permission, Subject};
///
/// let perm = Permission::new(Subject::Resource, Action::Publish);
/// assert_eq!(perm.to_string(), "resource:publish");
///
/// let perm = Permission::scoped(Subject::Project, Action::ManageMembers, 42);
/// assert_eq!(perm.to_string(), "project:manage_members:42");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    /// The subject this permission applies to.
    pub subject: Subject,
    /// The action allowed on the subject.
    pub action: Action,
    /// Optional item id; `None` applies to every item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,
}

impl Permission {
    /// Create a new global permission.
    pub fn new(subject: Subject, action: Action) -> Self {
        Self {
            subject,
            action,
            scope_id: None,
        }
    }

    /// Create a permission for a single item.
    pub fn scoped(subject: Subject, action: Action, scope_id: impl ToString) -> Self {
        Self {
            subject,
            action,
            scope_id: Some(scope_id.to_string()),
        }
    }

    /// Parse from string (e.g. "resource:publish" or "project:delete:42").
    ///
    /// # Example
    ///
    /// ```
    /// use dkn_rbac::{Action, Permission, Subject};
    ///
    /// let perm = Permission::parse("course:manage:7").unwrap();
    /// assert_eq!(perm.subject, Subject::Course);
    /// assert_eq!(perm.action, Action::Manage);
    /// assert_eq!(perm.scope_id.as_deref(), Some("7"));
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 2 {
            return None;
        }

        let subject = Subject::parse(parts[0])?;
        let action = Action::parse(parts[1])?;
        let scope_id = if parts.len() > 2 {
            Some(parts[2..].join(":"))
        } else {
            None
        };

        Some(Self {
            subject,
            action,
            scope_id,
        })
    }

    /// Check if this permission covers another.
    ///
    /// It does when the subjects match, the actions match (or this action
    /// implies the other), and this permission is global or scoped to the
    /// same item.
    pub fn covers(&self, other: &Permission) -> bool {
        if self.subject != other.subject {
            return false;
        }

        if self.action != other.action && !self.action.implies(other.action) {
            return false;
        }

        match (&self.scope_id, &other.scope_id) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => a == b,
        }
    }

    /// Check if this is a global permission.
    pub fn is_global(&self) -> bool {
        self.scope_id.is_none()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope_id {
            Some(id) => write!(f, "{}:{}:{}", self.subject.as_str(), self.action.as_str(), id),
            None => write!(f, "{}:{}", self.subject.as_str(), self.action.as_str()),
        }
    }
}

/// A set of permissions held by a role or granted through ownership.
///
/// Stored as permission strings; lookups honour global grants and action
/// implications.
///
/// # Example
///
/// ```
/// use dkn_rbac::{Action, Permission, PermissionSet, Subject};
///
/// let mut set = PermissionSet::new();
/// set.add(Permission::new(Subject::Course, Action::Manage));
///
/// // Manage implies Delete, and a global grant covers any course.
/// assert!(set.has(&Permission::scoped(Subject::Course, Action::Delete, 3)));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: HashSet<String>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: HashSet::new(),
        }
    }

    /// Add a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.insert(permission.to_string());
    }

    /// Remove a permission from the set.
    ///
    /// # Returns
    ///
    /// `true` if the permission was present
    pub fn remove(&mut self, permission: &Permission) -> bool {
        self.permissions.remove(&permission.to_string())
    }

    /// Check if the set grants a permission.
    ///
    /// This checks for:
    /// 1. Exact match
    /// 2. Global match (same subject and action, no scope)
    /// 3. Implied match (e.g. Manage implies Delete)
    pub fn has(&self, permission: &Permission) -> bool {
        if self.permissions.contains(&permission.to_string()) {
            return true;
        }

        if permission.scope_id.is_some() {
            let global = Permission::new(permission.subject, permission.action);
            if self.permissions.contains(&global.to_string()) {
                return true;
            }
        }

        Action::all()
            .into_iter()
            .filter(|action| *action != permission.action && action.implies(permission.action))
            .any(|action| {
                let implied = Permission {
                    subject: permission.subject,
                    action,
                    scope_id: permission.scope_id.clone(),
                };
                self.all().iter().any(|held| held.covers(&implied))
            })
    }

    /// Get all permissions in the set.
    pub fn all(&self) -> Vec<Permission> {
        self.permissions
            .iter()
            .filter_map(|s| Permission::parse(s))
            .collect()
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        for perm in &other.permissions {
            self.permissions.insert(perm.clone());
        }
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        for perm in iter {
            set.add(perm);
        }
        set
    }
}
