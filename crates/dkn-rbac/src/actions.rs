//! # Actions
//!
//! Defines the domain actions a user can perform on a [`Subject`](crate::Subject).
//! Actions are the verbs of the capability table: uploading, submitting,
//! deciding, publishing and so on.

use serde::{Deserialize, Serialize};

/// Actions that can be performed on subjects.
///
/// - **Read** / **List**: view one item or browse a collection
/// - **Create** / **Delete**: create or remove an item
/// - **Upload**: upload a file-backed item (resources, new versions)
/// - **Submit**: hand a draft to the review pipeline
/// - **Decide**: record a review decision
/// - **Publish** / **Unpublish**: toggle public visibility
/// - **ManageMembers** / **ManageWorkspaces**: project administration
/// - **Manage**: full administration of a subject
/// - **Take**: attempt a quiz
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// View a single item.
    Read,

    /// Browse a collection.
    List,

    /// Create a new item.
    Create,

    /// Upload a file-backed item.
    Upload,

    /// Submit a draft for review.
    Submit,

    /// Record a review decision.
    Decide,

    /// Make an item publicly visible.
    Publish,

    /// Withdraw a published item.
    Unpublish,

    /// Remove an item.
    Delete,

    /// Add or remove project members.
    ManageMembers,

    /// Create or remove project workspaces.
    ManageWorkspaces,

    /// Full administration of a subject.
    Manage,

    /// Attempt a quiz.
    Take,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::List => "list",
            Action::Create => "create",
            Action::Upload => "upload",
            Action::Submit => "submit",
            Action::Decide => "decide",
            Action::Publish => "publish",
            Action::Unpublish => "unpublish",
            Action::Delete => "delete",
            Action::ManageMembers => "manage_members",
            Action::ManageWorkspaces => "manage_workspaces",
            Action::Manage => "manage",
            Action::Take => "take",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use dkn_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("decide"), Some(Action::Decide));
    /// assert_eq!(Action::parse("review"), Some(Action::Decide)); // Alias
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "view" | "get" => Some(Action::Read),
            "list" | "browse" => Some(Action::List),
            "create" | "add" => Some(Action::Create),
            "upload" => Some(Action::Upload),
            "submit" => Some(Action::Submit),
            "decide" | "review" => Some(Action::Decide),
            "publish" => Some(Action::Publish),
            "unpublish" => Some(Action::Unpublish),
            "delete" | "remove" => Some(Action::Delete),
            "manage_members" => Some(Action::ManageMembers),
            "manage_workspaces" => Some(Action::ManageWorkspaces),
            "manage" | "admin" => Some(Action::Manage),
            "take" | "attempt" => Some(Action::Take),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Read,
            Action::List,
            Action::Create,
            Action::Upload,
            Action::Submit,
            Action::Decide,
            Action::Publish,
            Action::Unpublish,
            Action::Delete,
            Action::ManageMembers,
            Action::ManageWorkspaces,
            Action::Manage,
            Action::Take,
        ]
    }

    /// Check if this action implies another action.
    ///
    /// - `Manage` implies every other action except `Take`
    /// - every write action implies `Read`
    /// - `Publish` and `Unpublish` imply each other (one toggle)
    ///
    /// # Example
    ///
    /// ```
    /// use dkn_rbac::actions::Action;
    ///
    /// assert!(Action::Manage.implies(Action::Delete));
    /// assert!(Action::Publish.implies(Action::Unpublish));
    /// assert!(!Action::Read.implies(Action::Submit));
    /// ```
    pub fn implies(&self, other: Action) -> bool {
        match self {
            Action::Manage => other != Action::Take,
            Action::Publish => matches!(other, Action::Unpublish | Action::Read),
            Action::Unpublish => matches!(other, Action::Publish | Action::Read),
            Action::List | Action::Read => false,
            Action::Take => false,
            _ => other == Action::Read,
        }
    }

    /// Check if this action changes server state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::Read | Action::List)
    }
}
