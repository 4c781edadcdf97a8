//! # Resource Lifecycle Engine
//!
//! Pure predicates over a [`Resource`] snapshot that decide which actions
//! the client offers, plus the status state machine those actions drive.
//!
//! The predicates never perform I/O and never error. They only gate what
//! is offered; the server enforces every transition independently and the
//! caller refetches after each mutation instead of trusting
//! [`ResourceStatus::apply`].
//!
//! ## State machine (status axis)
//!
//! ```text
//! DRAFT ──submit──▶ PENDING_REVIEW
//! PENDING_REVIEW ──decision(d)──▶ APPROVED | REJECTED | FLAGGED | CHANGES_REQUESTED
//! APPROVED ──publish (council, GOV_COUNCIL stage)──▶ PUBLISHED
//! PUBLISHED ──unpublish──▶ UNPUBLISHED
//! UNPUBLISHED ──publish──▶ PUBLISHED
//! DRAFT | REJECTED | FLAGGED | APPROVED | CHANGES_REQUESTED ──upload version──▶ DRAFT
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use dkn_rbac::{AccessGate, User};

use crate::error::TransitionError;
use crate::resource::Resource;
use crate::status::{PublishState, ResourceStatus, ReviewDecision, Stage};

/// Effective publish state of a resource, derived from its review log.
pub fn derive_publish_state(resource: &Resource) -> PublishState {
    resource.publish_state()
}

/// A draft may be handed to the review pipeline.
pub fn can_submit_for_review(resource: &Resource) -> bool {
    resource.status == ResourceStatus::Draft
}

/// A new version may be uploaded while the resource is editable.
///
/// Resources under review or on the published/unpublished track are
/// excluded.
pub fn can_upload_new_version(resource: &Resource) -> bool {
    matches!(
        resource.status,
        ResourceStatus::Draft
            | ResourceStatus::Flagged
            | ResourceStatus::Approved
            | ResourceStatus::Rejected
            | ResourceStatus::ChangesRequested
    )
}

/// A reviewer decision may be recorded only while review is pending.
pub fn can_make_decision(resource: &Resource) -> bool {
    resource.status == ResourceStatus::PendingReview
}

/// `user` may publish the resource.
///
/// Either the re-publish path (currently unpublished) or the first-publish
/// path (never published, approved, and at the council stage). Only roles
/// holding the publish capability qualify.
///
/// # Examples
///
/// ```
/// use dkn_knowledge::{lifecycle, Resource, ResourceStatus, Stage};
/// use dkn_rbac::{Role, User};
///
/// let resource = Resource::new(1, "Guide", ResourceStatus::Approved).with_stage(Stage::GovCouncil);
/// assert!(lifecycle::can_publish(&resource, &User::new(1, "c", Role::Council)));
/// assert!(!lifecycle::can_publish(&resource, &User::new(2, "o", Role::Officer)));
/// ```
pub fn can_publish(resource: &Resource, user: &User) -> bool {
    AccessGate::new(user).can_publish() && publish_path_open(resource)
}

/// `user` may withdraw a currently published resource.
pub fn can_unpublish(resource: &Resource, user: &User) -> bool {
    AccessGate::new(user).can_publish() && unpublish_path_open(resource)
}

/// The resource's status allows deletion.
///
/// Resources mid-review, approved, or live must move off those states
/// first. Uploader ownership is checked by the Authorization Gate.
pub fn can_delete_resource(resource: &Resource) -> bool {
    matches!(
        resource.status,
        ResourceStatus::Draft
            | ResourceStatus::Rejected
            | ResourceStatus::Flagged
            | ResourceStatus::Unpublished
    )
}

fn publish_path_open(resource: &Resource) -> bool {
    match resource.publish_state() {
        PublishState::Unpublished => true,
        PublishState::NeverPublished => {
            resource.status == ResourceStatus::Approved && resource.is_at_stage(&Stage::GovCouncil)
        }
        PublishState::Published => false,
    }
}

fn unpublish_path_open(resource: &Resource) -> bool {
    resource.publish_state() == PublishState::Published
}

/// A mutating action on a resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAction {
    Submit,
    Decide,
    Publish,
    Unpublish,
    UploadVersion,
    Delete,
}

impl ResourceAction {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceAction::Submit => "submit",
            ResourceAction::Decide => "decide",
            ResourceAction::Publish => "publish",
            ResourceAction::Unpublish => "unpublish",
            ResourceAction::UploadVersion => "upload_version",
            ResourceAction::Delete => "delete",
        }
    }

    /// Every action, in the order screens list them.
    pub fn all() -> [ResourceAction; 6] {
        [
            ResourceAction::Submit,
            ResourceAction::UploadVersion,
            ResourceAction::Decide,
            ResourceAction::Publish,
            ResourceAction::Unpublish,
            ResourceAction::Delete,
        ]
    }

    /// Generic message shown when the action fails for any reason.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ResourceAction::Submit => "Failed to submit resource for review.",
            ResourceAction::Decide => "Failed to submit decision.",
            ResourceAction::Publish => "Failed to publish resource.",
            ResourceAction::Unpublish => "Failed to unpublish resource.",
            ResourceAction::UploadVersion => "Failed to upload new version.",
            ResourceAction::Delete => "Failed to delete resource.",
        }
    }

    /// Message shown after the action succeeds.
    pub fn success_message(&self) -> &'static str {
        match self {
            ResourceAction::Submit => "Resource submitted for review.",
            ResourceAction::Decide => "Decision recorded.",
            ResourceAction::Publish => "Resource published.",
            ResourceAction::Unpublish => "Resource unpublished.",
            ResourceAction::UploadVersion => "New version uploaded.",
            ResourceAction::Delete => "Resource deleted.",
        }
    }
}

impl fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The actions a user may take on one resource right now.
///
/// Combines the status predicates of this module with the Authorization
/// Gate and uploader ownership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceActions {
    pub submit: bool,
    pub upload_version: bool,
    pub decide: bool,
    pub publish: bool,
    pub unpublish: bool,
    pub delete: bool,
}

impl ResourceActions {
    /// Evaluate the permitted actions of `user` on `resource`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dkn_knowledge::{Resource, ResourceAction, ResourceActions, ResourceStatus};
    /// use dkn_rbac::{Role, User};
    ///
    /// let owner = User::new(4, "dana", Role::Employee);
    /// let draft = Resource::new(1, "Guide", ResourceStatus::Draft).with_uploader(4);
    ///
    /// let actions = ResourceActions::evaluate(&draft, &owner);
    /// assert_eq!(
    ///     actions.permitted(),
    ///     vec![ResourceAction::Submit, ResourceAction::UploadVersion, ResourceAction::Delete]
    /// );
    /// ```
    pub fn evaluate(resource: &Resource, user: &User) -> Self {
        Self::with_gate(resource, &AccessGate::new(user))
    }

    /// Evaluate against an existing gate (e.g. one carrying extra grants).
    pub fn with_gate(resource: &Resource, gate: &AccessGate) -> Self {
        let uploader = resource.uploader_ownership(gate.user());

        Self {
            submit: can_submit_for_review(resource) && gate.can_submit_for_review(uploader),
            upload_version: can_upload_new_version(resource) && gate.can_upload_version(uploader),
            decide: can_make_decision(resource) && gate.can_make_review_decision(),
            publish: gate.can_publish() && publish_path_open(resource),
            unpublish: gate.can_publish() && unpublish_path_open(resource),
            delete: can_delete_resource(resource) && gate.can_delete_resource(uploader),
        }
    }

    /// Check a single action.
    pub fn allows(&self, action: ResourceAction) -> bool {
        match action {
            ResourceAction::Submit => self.submit,
            ResourceAction::UploadVersion => self.upload_version,
            ResourceAction::Decide => self.decide,
            ResourceAction::Publish => self.publish,
            ResourceAction::Unpublish => self.unpublish,
            ResourceAction::Delete => self.delete,
        }
    }

    /// Permitted actions in display order.
    pub fn permitted(&self) -> Vec<ResourceAction> {
        ResourceAction::all()
            .into_iter()
            .filter(|action| self.allows(*action))
            .collect()
    }

    /// Check if nothing is permitted.
    pub fn is_empty(&self) -> bool {
        self.permitted().is_empty()
    }
}

/// A status-changing event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", tag = "type", content = "decision")]
pub enum Transition {
    Submit,
    Decide(ReviewDecision),
    Publish,
    Unpublish,
    UploadVersion,
}

impl Transition {
    /// The action that triggers this transition.
    pub fn action(&self) -> ResourceAction {
        match self {
            Transition::Submit => ResourceAction::Submit,
            Transition::Decide(_) => ResourceAction::Decide,
            Transition::Publish => ResourceAction::Publish,
            Transition::Unpublish => ResourceAction::Unpublish,
            Transition::UploadVersion => ResourceAction::UploadVersion,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Decide(decision) => write!(f, "decide {}", decision),
            other => f.write_str(other.action().as_str()),
        }
    }
}

impl ResourceStatus {
    /// Apply a transition to this status.
    ///
    /// This is the client's expectation only; the refetched server status
    /// is authoritative.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] for any edge not in the state machine.
    ///
    /// # Examples
    ///
    /// ```
    /// use dkn_knowledge::{ResourceStatus, ReviewDecision, Transition};
    ///
    /// let status = ResourceStatus::Draft.apply(Transition::Submit).unwrap();
    /// assert_eq!(status, ResourceStatus::PendingReview);
    ///
    /// let status = status.apply(Transition::Decide(ReviewDecision::Flagged)).unwrap();
    /// assert_eq!(status, ResourceStatus::Flagged);
    ///
    /// assert!(ResourceStatus::Published.apply(Transition::Submit).is_err());
    /// ```
    pub fn apply(self, transition: Transition) -> Result<ResourceStatus, TransitionError> {
        use ResourceStatus::*;

        let next = match (self, transition) {
            (Draft, Transition::Submit) => Some(PendingReview),
            (PendingReview, Transition::Decide(decision)) if decision.is_reviewer_decision() => {
                Some(decision.resulting_status())
            }
            (Approved | Unpublished, Transition::Publish) => Some(Published),
            (Published, Transition::Unpublish) => Some(Unpublished),
            (Draft | Rejected | Flagged | Approved | ChangesRequested, Transition::UploadVersion) => {
                Some(Draft)
            }
            _ => None,
        };

        next.ok_or(TransitionError {
            from: self,
            transition,
        })
    }
}
