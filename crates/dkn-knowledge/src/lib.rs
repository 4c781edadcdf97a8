//! # DKN Knowledge (Resource Lifecycle Engine)
//!
//! Domain model of the DKN knowledge network and the pure logic that
//! decides which actions a resource currently allows.
//!
//! ## Overview
//!
//! The dkn-knowledge crate handles:
//! - **Resources**: versions, review steps, AI flags
//! - **Lifecycle**: status state machine and action predicates
//! - **Review log**: publish state derived from review events, history views
//! - **Collaboration**: projects, assignments, workspaces, posts
//! - **Training**: courses, quizzes, attempts, leaderboards
//! - **Uploads**: multipart form contents for resources and versions
//!
//! ## Architecture
//!
//! ```text
//! Resource
//!   ├─ status ──────────── ResourceStatus::apply(Transition)
//!   ├─ current_stage ───── first-publish gate (GOV_COUNCIL)
//!   ├─ versions[]
//!   ├─ review_steps[] ──── ReviewLog ─→ PublishState
//!   └─ ai_flags[]          (informational)
//!
//! ResourceActions::evaluate(resource, user)
//!   = lifecycle predicates ∧ AccessGate (role table + ownership)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use dkn_knowledge::{
//!     PublishState, ResourceAction, ResourceActions, Resource, ResourceStatus,
//!     ReviewDecision, ReviewStep, Stage,
//! };
//! use dkn_rbac::{Role, User};
//!
//! let council = User::new(9, "cleo", Role::Council);
//! let resource = Resource::new(1, "Safety handbook", ResourceStatus::Published)
//!     .with_stage(Stage::GovCouncil)
//!     .with_step(ReviewStep::new(1, ReviewDecision::Published, None));
//!
//! assert_eq!(resource.publish_state(), PublishState::Published);
//! let actions = ResourceActions::evaluate(&resource, &council);
//! assert_eq!(actions.permitted(), vec![ResourceAction::Unpublish]);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod collab;
pub mod error;
pub mod lifecycle;
pub mod resource;
pub mod review;
pub mod status;
pub mod training;
pub mod upload;
mod wire;

// Re-export main types for convenience
pub use error::{TransitionError, ValidationError, ValidationResult};
pub use lifecycle::{
    can_delete_resource, can_make_decision, can_publish, can_submit_for_review, can_unpublish,
    can_upload_new_version, derive_publish_state, ResourceAction, ResourceActions, Transition,
};
pub use resource::{AiFlag, Region, Resource, ResourceId, Severity, Version};
pub use review::{DecisionPolicy, DecisionRequest, ReviewLog, ReviewRecord, ReviewStep};
pub use status::{PublishState, ResourceStatus, ReviewDecision, Stage};
pub use upload::{FileUpload, ResourceUpload, UploadKind};
