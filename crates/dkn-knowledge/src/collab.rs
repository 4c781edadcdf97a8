//! # Collaboration projects
//!
//! Projects group a team (assignments), its workspaces and their posts.
//! Every management right here is ownership-scoped:
//!
//! - project lead: add/remove members, create/delete workspaces
//! - project lead or creator: delete the project
//! - post author: delete the post
//!
//! The helpers on each model compute the [`Ownership`] the Authorization
//! Gate expects; they never decide the permission themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dkn_rbac::{Ownership, User, UserId};

use crate::error::{ValidationError, ValidationResult};

/// Server-assigned project identifier.
pub type ProjectId = i64;

/// Server-assigned workspace identifier.
pub type WorkspaceId = i64;

/// A user as embedded in collaboration payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A collaboration project.
///
/// # Examples
///
/// ```
/// use dkn_knowledge::collab::{Project, UserSummary};
/// use dkn_rbac::{Ownership, Role, User};
///
/// let lead = User::new(2, "lee", Role::Officer);
/// let mut project = Project::new(10, "Harbour survey");
/// project.lead = Some(UserSummary { id: 2, username: "lee".into(), email: None });
///
/// assert_eq!(project.lead_ownership(&lead), Ownership::Owner);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// Project ID
    pub id: ProjectId,

    /// Display name
    pub name: String,

    /// Client the project is run for
    #[serde(default)]
    pub client: Option<String>,

    /// Region
    #[serde(default)]
    pub region: Option<String>,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Free-form status label (e.g. "ACTIVE")
    #[serde(default)]
    pub status: Option<String>,

    /// Project lead
    #[serde(default)]
    pub lead: Option<UserSummary>,

    /// Creator's user id
    #[serde(default, deserialize_with = "crate::wire::optional_user_id")]
    pub created_by: Option<UserId>,

    /// Creator's username
    #[serde(default)]
    pub created_by_name: Option<String>,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Create a project with only an id and a name.
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            client: None,
            region: None,
            description: None,
            status: None,
            lead: None,
            created_by: None,
            created_by_name: None,
            created_at: None,
        }
    }

    /// Whether `user` leads this project.
    ///
    /// A project without a lead has no lead rights to hand out, so this is
    /// `NotOwner` rather than `Unknown`.
    pub fn lead_ownership(&self, user: &User) -> Ownership {
        match &self.lead {
            Some(lead) if lead.id == user.id => Ownership::Owner,
            _ => Ownership::NotOwner,
        }
    }

    /// Whether `user` created this project.
    pub fn creator_ownership(&self, user: &User) -> Ownership {
        match self.created_by {
            Some(id) if id == user.id => Ownership::Owner,
            _ => Ownership::NotOwner,
        }
    }

    /// Ownership used for project deletion: lead or creator.
    pub fn delete_ownership(&self, user: &User) -> Ownership {
        self.lead_ownership(user).either(self.creator_ownership(user))
    }

    /// Name shown for the person in charge.
    pub fn owner_label(&self) -> &str {
        self.lead
            .as_ref()
            .map(|lead| lead.username.as_str())
            .or(self.created_by_name.as_deref())
            .unwrap_or("-")
    }
}

/// Body of `POST /collab/projects/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub client: String,
    pub region: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "NewProject::default_status")]
    pub status: String,
}

impl NewProject {
    fn default_status() -> String {
        "ACTIVE".to_string()
    }

    /// Start a project payload.
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            status: Self::default_status(),
            ..Self::default()
        }
    }

    /// Check the required fields.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.region.trim().is_empty() {
            return Err(ValidationError::MissingField("region"));
        }
        Ok(())
    }
}

/// Role of a user inside one project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentRole {
    Lead,
    Member,
    Reviewer,
    Stakeholder,
}

impl AssignmentRole {
    /// Get the string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentRole::Lead => "LEAD",
            AssignmentRole::Member => "MEMBER",
            AssignmentRole::Reviewer => "REVIEWER",
            AssignmentRole::Stakeholder => "STAKEHOLDER",
        }
    }

    /// Roles a lead may hand out when adding a member.
    pub fn assignable() -> [AssignmentRole; 3] {
        [
            AssignmentRole::Member,
            AssignmentRole::Reviewer,
            AssignmentRole::Stakeholder,
        ]
    }
}

/// A user's membership in a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    /// Assignment ID
    #[serde(default)]
    pub id: i64,

    /// The assigned user
    pub user: UserSummary,

    /// Role inside the project
    pub role: AssignmentRole,

    /// When the user was added
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
}

impl Assignment {
    /// The lead's own assignment is never removable.
    pub fn is_removable(&self) -> bool {
        self.role != AssignmentRole::Lead
    }
}

/// Body of `POST /collab/projects/{id}/assignments/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewAssignment {
    pub user_id: UserId,
    pub role: AssignmentRole,
}

impl NewAssignment {
    /// Assign `user_id` with `role`.
    pub fn new(user_id: UserId, role: AssignmentRole) -> Self {
        Self { user_id, role }
    }

    /// The lead is set on the project, never through assignments.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.role == AssignmentRole::Lead {
            return Err(ValidationError::LeadAssignment);
        }
        Ok(())
    }
}

/// A workspace ("space") inside a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub id: WorkspaceId,
    #[serde(default)]
    pub project: Option<ProjectId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /collab/projects/{id}/spaces/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewWorkspace {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
}

impl NewWorkspace {
    /// Start a workspace payload.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Check the required fields.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        Ok(())
    }
}

/// A message (optionally with a file) posted in a workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub author: Option<UserSummary>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Whether `user` wrote this post. Posts without an author belong to
    /// no one.
    pub fn author_ownership(&self, user: &User) -> Ownership {
        match &self.author {
            Some(author) if author.id == user.id => Ownership::Owner,
            _ => Ownership::NotOwner,
        }
    }
}
