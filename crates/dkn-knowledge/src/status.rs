//! # Lifecycle vocabulary
//!
//! Wire enums shared by resources and their review log: the coarse
//! lifecycle [`ResourceStatus`], the pipeline [`Stage`], the
//! [`ReviewDecision`] recorded by each review step, and the derived
//! [`PublishState`].
//!
//! Status and stage are independent axes. Status is what the state machine
//! in [`lifecycle`](crate::lifecycle) moves; stage is advanced by reviewers
//! on the server and only compared for the first-publish gate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse lifecycle state of a resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    /// Being edited by the uploader
    Draft,
    /// Waiting for a reviewer decision
    PendingReview,
    /// Flagged by a reviewer
    Flagged,
    /// Approved at the current stage
    Approved,
    /// Rejected by a reviewer
    Rejected,
    /// Publicly visible
    Published,
    /// Withdrawn after being published
    Unpublished,
    /// Reviewer asked the uploader for changes
    ChangesRequested,
}

impl ResourceStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Draft => "DRAFT",
            ResourceStatus::PendingReview => "PENDING_REVIEW",
            ResourceStatus::Flagged => "FLAGGED",
            ResourceStatus::Approved => "APPROVED",
            ResourceStatus::Rejected => "REJECTED",
            ResourceStatus::Published => "PUBLISHED",
            ResourceStatus::Unpublished => "UNPUBLISHED",
            ResourceStatus::ChangesRequested => "CHANGES_REQUESTED",
        }
    }

    /// Parse a wire name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(ResourceStatus::Draft),
            "PENDING_REVIEW" => Some(ResourceStatus::PendingReview),
            "FLAGGED" => Some(ResourceStatus::Flagged),
            "APPROVED" => Some(ResourceStatus::Approved),
            "REJECTED" => Some(ResourceStatus::Rejected),
            "PUBLISHED" => Some(ResourceStatus::Published),
            "UNPUBLISHED" => Some(ResourceStatus::Unpublished),
            "CHANGES_REQUESTED" => Some(ResourceStatus::ChangesRequested),
            _ => None,
        }
    }

    /// Every status, in pipeline order.
    pub fn all() -> [ResourceStatus; 8] {
        [
            ResourceStatus::Draft,
            ResourceStatus::PendingReview,
            ResourceStatus::Flagged,
            ResourceStatus::Approved,
            ResourceStatus::Rejected,
            ResourceStatus::Published,
            ResourceStatus::Unpublished,
            ResourceStatus::ChangesRequested,
        ]
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review pipeline stage a resource is waiting at.
///
/// Labels the client does not know are kept verbatim in [`Stage::Other`]
/// so a server-side pipeline change never breaks deserialization.
///
/// # Examples
///
/// ```
/// use dkn_knowledge::Stage;
///
/// let stage: Stage = serde_json::from_str("\"GOV_COUNCIL\"").unwrap();
/// assert_eq!(stage, Stage::GovCouncil);
///
/// let custom: Stage = serde_json::from_str("\"LEGAL\"").unwrap();
/// assert_eq!(custom, Stage::Other("LEGAL".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    /// Knowledge Champion review
    ChampionReview,
    /// Regional Officer review
    RegionalOfficer,
    /// Governance Council review, the last stage before publishing
    GovCouncil,
    /// Any stage label this client does not model
    Other(String),
}

impl Stage {
    /// Wire name of the stage.
    pub fn as_str(&self) -> &str {
        match self {
            Stage::ChampionReview => "CHAMPION_REVIEW",
            Stage::RegionalOfficer => "REGIONAL_OFFICER",
            Stage::GovCouncil => "GOV_COUNCIL",
            Stage::Other(label) => label,
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &str {
        match self {
            Stage::ChampionReview => "Champion Review",
            Stage::RegionalOfficer => "Regional Officer",
            Stage::GovCouncil => "Governance Council",
            Stage::Other(label) => label,
        }
    }

    /// Check if this is the final (council) stage.
    pub fn is_final(&self) -> bool {
        matches!(self, Stage::GovCouncil)
    }
}

impl From<String> for Stage {
    fn from(label: String) -> Self {
        match label.as_str() {
            "CHAMPION_REVIEW" => Stage::ChampionReview,
            "REGIONAL_OFFICER" => Stage::RegionalOfficer,
            "GOV_COUNCIL" => Stage::GovCouncil,
            _ => Stage::Other(label),
        }
    }
}

impl From<&str> for Stage {
    fn from(label: &str) -> Self {
        Stage::from(label.to_string())
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision recorded by one review step.
///
/// The first four are reviewer decisions. `Published` and `Unpublished`
/// are written by the publish/unpublish endpoints and drive
/// [`PublishState`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Approved,
    Rejected,
    Flagged,
    ChangesRequested,
    Published,
    Unpublished,
}

impl ReviewDecision {
    /// Wire name of the decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::Approved => "APPROVED",
            ReviewDecision::Rejected => "REJECTED",
            ReviewDecision::Flagged => "FLAGGED",
            ReviewDecision::ChangesRequested => "CHANGES_REQUESTED",
            ReviewDecision::Published => "PUBLISHED",
            ReviewDecision::Unpublished => "UNPUBLISHED",
        }
    }

    /// Parse a wire name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "APPROVED" => Some(ReviewDecision::Approved),
            "REJECTED" => Some(ReviewDecision::Rejected),
            "FLAGGED" => Some(ReviewDecision::Flagged),
            "CHANGES_REQUESTED" => Some(ReviewDecision::ChangesRequested),
            "PUBLISHED" => Some(ReviewDecision::Published),
            "UNPUBLISHED" => Some(ReviewDecision::Unpublished),
            _ => None,
        }
    }

    /// Decisions a reviewer may record through the decision endpoint.
    pub fn reviewer_decisions() -> [ReviewDecision; 4] {
        [
            ReviewDecision::Approved,
            ReviewDecision::Rejected,
            ReviewDecision::Flagged,
            ReviewDecision::ChangesRequested,
        ]
    }

    /// Check if a reviewer may record this decision.
    pub fn is_reviewer_decision(&self) -> bool {
        !self.is_publication()
    }

    /// Check if this is a publish/unpublish event.
    pub fn is_publication(&self) -> bool {
        matches!(self, ReviewDecision::Published | ReviewDecision::Unpublished)
    }

    /// Status a resource moves to when this decision is recorded.
    pub fn resulting_status(&self) -> ResourceStatus {
        match self {
            ReviewDecision::Approved => ResourceStatus::Approved,
            ReviewDecision::Rejected => ResourceStatus::Rejected,
            ReviewDecision::Flagged => ResourceStatus::Flagged,
            ReviewDecision::ChangesRequested => ResourceStatus::ChangesRequested,
            ReviewDecision::Published => ResourceStatus::Published,
            ReviewDecision::Unpublished => ResourceStatus::Unpublished,
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective publish state, derived from the review log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishState {
    Published,
    Unpublished,
    NeverPublished,
}

impl PublishState {
    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishState::Published => "PUBLISHED",
            PublishState::Unpublished => "UNPUBLISHED",
            PublishState::NeverPublished => "NEVER_PUBLISHED",
        }
    }

    /// Check if the resource is currently live.
    pub fn is_live(&self) -> bool {
        matches!(self, PublishState::Published)
    }
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
