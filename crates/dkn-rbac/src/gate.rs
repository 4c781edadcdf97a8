//! # Authorization Gate
//!
//! Maps the acting user's role, plus ownership of the item at hand, to the
//! capabilities every screen exposes. All role checks go through here so no
//! caller re-derives `role == X` conditionals on its own.
//!
//! Failing checks return `false`; they never error. The gate only decides
//! what the client offers. The server remains the enforcer and rejects a
//! disallowed call on its own.
//!
//! ## Capability table
//!
//! | Role | Upload | Submit | Decide | Publish | Create project | Manage quiz | Review queue |
//! |---|---|---|---|---|---|---|---|
//! | EMPLOYEE | yes | own drafts | no | no | yes | no | no |
//! | CHAMPION | no | no | yes | no | yes | own courses | yes |
//! | OFFICER | no | no | yes | no | no | no | yes |
//! | COUNCIL | no | no | yes | yes | no | no | yes |
//!
//! ## Ownership-scoped grants
//!
//! - project lead: member add/remove, workspace create/delete (any role)
//! - project lead or creator: project delete
//! - course creator (Champion): materials and quiz management
//! - post author: post delete
//! - resource uploader: submit, new version, delete

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::permissions::{Permission, PermissionSet};
use crate::roles::Role;
use crate::subjects::{Area, Subject};
use crate::user::{User, UserId};

/// Whether the acting user owns the item a check is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The acting user owns the item.
    Owner,
    /// Someone else owns the item.
    NotOwner,
    /// The server did not say who owns the item.
    Unknown,
}

impl Ownership {
    /// Compare an optional owner id against the acting user.
    ///
    /// # Examples
    ///
    /// ```
    /// use dkn_rbac::{Ownership, Role, User};
    ///
    /// let user = User::new(1, "sam", Role::Employee);
    /// assert_eq!(Ownership::of(&user, Some(1)), Ownership::Owner);
    /// assert_eq!(Ownership::of(&user, Some(2)), Ownership::NotOwner);
    /// assert_eq!(Ownership::of(&user, None), Ownership::Unknown);
    /// ```
    pub fn of(user: &User, owner: Option<UserId>) -> Self {
        match owner {
            Some(id) if id == user.id => Ownership::Owner,
            Some(_) => Ownership::NotOwner,
            None => Ownership::Unknown,
        }
    }

    /// Compare an optional owner username against the acting user.
    pub fn of_username(user: &User, owner: Option<&str>) -> Self {
        match owner {
            Some(name) if name == user.username => Ownership::Owner,
            Some(_) => Ownership::NotOwner,
            None => Ownership::Unknown,
        }
    }

    /// Owner if either side is owned (e.g. project lead or project creator).
    pub fn either(self, other: Ownership) -> Self {
        match (self, other) {
            (Ownership::Owner, _) | (_, Ownership::Owner) => Ownership::Owner,
            (Ownership::NotOwner, _) | (_, Ownership::NotOwner) => Ownership::NotOwner,
            _ => Ownership::Unknown,
        }
    }

    /// Check if ownership is established.
    pub fn is_owner(&self) -> bool {
        matches!(self, Ownership::Owner)
    }
}

/// How ownership combines with the role table for a subject/action pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnershipRule {
    /// Role alone decides.
    RoleOnly,
    /// Role must grant it and the user must own the item.
    RoleAndOwner,
    /// Role must grant it; ownership is only checked when known.
    RoleAndOwnerIfKnown,
    /// Owning the item is enough, whatever the role.
    OwnerOnly,
}

fn ownership_rule(subject: Subject, action: Action) -> OwnershipRule {
    match (subject, action) {
        (Subject::Resource, Action::Submit | Action::Delete) => OwnershipRule::RoleAndOwnerIfKnown,
        (Subject::Project, Action::Delete | Action::ManageMembers | Action::ManageWorkspaces) => {
            OwnershipRule::OwnerOnly
        }
        (Subject::Workspace, Action::Create | Action::Delete) => OwnershipRule::OwnerOnly,
        (Subject::Post, Action::Delete) => OwnershipRule::OwnerOnly,
        (Subject::Course | Subject::Quiz, Action::Manage) => OwnershipRule::RoleAndOwner,
        _ => OwnershipRule::RoleOnly,
    }
}

/// Navigation sections of the front end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Published resources (everyone).
    Published,
    /// The uploader's own resources.
    MyResources,
    /// New resource upload form.
    Upload,
    /// Resources awaiting review.
    ReviewQueue,
    /// Decisions the reviewer has recorded.
    MyReviewActions,
    /// Collaboration projects.
    Projects,
    /// Training courses.
    Training,
    /// Quiz leaderboards.
    Leaderboard,
}

impl Section {
    /// Area of the front end this section belongs to.
    pub fn area(&self) -> Area {
        match self {
            Section::Published
            | Section::MyResources
            | Section::Upload
            | Section::ReviewQueue
            | Section::MyReviewActions => Area::Knowledge,
            Section::Projects => Area::Collab,
            Section::Training | Section::Leaderboard => Area::Training,
        }
    }
}

/// One row of the capability table, resolved for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// May upload new resources.
    pub upload_resource: bool,
    /// May submit (own) drafts for review.
    pub submit_for_review: bool,
    /// May record review decisions.
    pub make_review_decision: bool,
    /// May publish and unpublish.
    pub publish: bool,
    /// May create collaboration projects.
    pub create_project: bool,
    /// May manage quizzes of courses they created.
    pub manage_training_quiz: bool,
    /// May open the review queue.
    pub view_review_queue: bool,
}

/// The Authorization Gate for one acting user.
///
/// # Examples
///
/// ```
/// use dkn_rbac::{AccessGate, Ownership, Role, User};
///
/// let lead = User::new(3, "lee", Role::Officer);
/// let gate = AccessGate::new(&lead);
///
/// // Officers cannot create projects, but a lead manages their own.
/// assert!(!gate.can_create_project());
/// assert!(gate.can_manage_project_members(Ownership::of(&lead, Some(3))));
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate {
    user: User,
    permissions: PermissionSet,
}

impl AccessGate {
    /// Build the gate for a user from their role's default permissions.
    pub fn new(user: &User) -> Self {
        Self {
            user: user.clone(),
            permissions: user.role.default_permissions(),
        }
    }

    /// The acting user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// The acting user's role.
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Add an extra grant on top of the role table (e.g. a server-issued
    /// per-item permission).
    pub fn grant(&mut self, permission: Permission) {
        self.permissions.add(permission);
    }

    /// Generic check of a subject/action pair under the given ownership.
    pub fn check(&self, subject: Subject, action: Action, ownership: Ownership) -> bool {
        self.check_item(subject, action, None, ownership)
    }

    /// Like [`check`](Self::check), additionally honouring grants scoped to
    /// a single item id.
    pub fn check_item(
        &self,
        subject: Subject,
        action: Action,
        item_id: Option<&str>,
        ownership: Ownership,
    ) -> bool {
        let wanted = match item_id {
            Some(id) => Permission::scoped(subject, action, id),
            None => Permission::new(subject, action),
        };
        let role_grant = self.permissions.has(&wanted);

        match ownership_rule(subject, action) {
            OwnershipRule::RoleOnly => role_grant,
            OwnershipRule::RoleAndOwner => role_grant && ownership.is_owner(),
            OwnershipRule::RoleAndOwnerIfKnown => role_grant && ownership != Ownership::NotOwner,
            OwnershipRule::OwnerOnly => ownership.is_owner(),
        }
    }

    /// The capability table row for the acting user's role.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            upload_resource: self.can_upload_resource(),
            submit_for_review: self.can_submit_for_review(Ownership::Unknown),
            make_review_decision: self.can_make_review_decision(),
            publish: self.can_publish(),
            create_project: self.can_create_project(),
            manage_training_quiz: self.can_manage_quiz(Ownership::Owner),
            view_review_queue: self.can_view_review_queue(),
        }
    }

    // ---- knowledge ----

    /// May upload a brand-new resource.
    pub fn can_upload_resource(&self) -> bool {
        self.check(Subject::Resource, Action::Upload, Ownership::Unknown)
    }

    /// May upload a new version of an existing resource.
    pub fn can_upload_version(&self, uploader: Ownership) -> bool {
        self.can_upload_resource() && uploader != Ownership::NotOwner
    }

    /// May submit a draft for review.
    pub fn can_submit_for_review(&self, uploader: Ownership) -> bool {
        self.check(Subject::Resource, Action::Submit, uploader)
    }

    /// May record a review decision.
    pub fn can_make_review_decision(&self) -> bool {
        self.check(Subject::Review, Action::Decide, Ownership::Unknown)
    }

    /// May publish or unpublish resources.
    pub fn can_publish(&self) -> bool {
        self.check(Subject::Resource, Action::Publish, Ownership::Unknown)
    }

    /// May delete a resource (status is checked separately).
    pub fn can_delete_resource(&self, uploader: Ownership) -> bool {
        self.check(Subject::Resource, Action::Delete, uploader)
    }

    /// May open the review queue and the reviewer's own action history.
    pub fn can_view_review_queue(&self) -> bool {
        self.check(Subject::ReviewQueue, Action::List, Ownership::Unknown)
    }

    // ---- collaboration ----

    /// May create a collaboration project.
    pub fn can_create_project(&self) -> bool {
        self.check(Subject::Project, Action::Create, Ownership::Unknown)
    }

    /// May delete a project; pass lead-or-creator ownership.
    pub fn can_delete_project(&self, lead_or_creator: Ownership) -> bool {
        self.check(Subject::Project, Action::Delete, lead_or_creator)
    }

    /// May add or remove project members.
    pub fn can_manage_project_members(&self, lead: Ownership) -> bool {
        self.check(Subject::Project, Action::ManageMembers, lead)
    }

    /// May create or delete workspaces in a project.
    pub fn can_manage_workspaces(&self, lead: Ownership) -> bool {
        self.check(Subject::Project, Action::ManageWorkspaces, lead)
    }

    /// May delete a workspace post.
    pub fn can_delete_post(&self, author: Ownership) -> bool {
        self.check(Subject::Post, Action::Delete, author)
    }

    // ---- training ----

    /// May create a training course.
    pub fn can_create_course(&self) -> bool {
        self.check(Subject::Course, Action::Create, Ownership::Unknown)
    }

    /// May manage materials of a course.
    pub fn can_manage_course(&self, creator: Ownership) -> bool {
        self.check(Subject::Course, Action::Manage, creator)
    }

    /// May manage the quiz of a course.
    pub fn can_manage_quiz(&self, creator: Ownership) -> bool {
        self.check(Subject::Quiz, Action::Manage, creator)
    }

    /// May take course quizzes.
    pub fn can_take_quiz(&self) -> bool {
        self.check(Subject::Quiz, Action::Take, Ownership::Unknown)
    }

    // ---- navigation ----

    /// Check a single navigation section.
    pub fn can_enter(&self, section: Section) -> bool {
        match section {
            Section::Published => self.check(Subject::Resource, Action::List, Ownership::Unknown),
            Section::MyResources | Section::Upload => self.can_upload_resource(),
            Section::ReviewQueue | Section::MyReviewActions => self.can_view_review_queue(),
            Section::Projects => self.check(Subject::Project, Action::List, Ownership::Unknown),
            Section::Training => self.can_take_quiz() || self.can_create_course(),
            Section::Leaderboard => {
                self.check(Subject::Leaderboard, Action::Read, Ownership::Unknown)
            }
        }
    }

    /// Navigation sections visible to the acting user, in menu order.
    pub fn sections(&self) -> Vec<Section> {
        [
            Section::Published,
            Section::MyResources,
            Section::Upload,
            Section::ReviewQueue,
            Section::MyReviewActions,
            Section::Projects,
            Section::Training,
            Section::Leaderboard,
        ]
        .into_iter()
        .filter(|s| self.can_enter(*s))
        .collect()
    }
}
