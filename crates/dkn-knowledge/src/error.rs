//! Error types for lifecycle transitions and action payloads.

use thiserror::Error;

use crate::lifecycle::Transition;
use crate::status::{ResourceStatus, ReviewDecision};

/// A status change the state machine does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {transition} a resource in status {from}")]
pub struct TransitionError {
    /// Status the resource was in
    pub from: ResourceStatus,
    /// Transition that was attempted
    pub transition: Transition,
}

/// A malformed action payload, caught before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Publish/unpublish decisions go through their own endpoints
    #[error("{0} is not a reviewer decision")]
    NotReviewerDecision(ReviewDecision),

    /// The decision policy requires a comment for this decision
    #[error("a comment is required when the decision is {0}")]
    CommentRequired(ReviewDecision),

    /// Upload without a file
    #[error("a file is required")]
    MissingFile,

    /// Required text field left blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Quiz submitted with no answers
    #[error("answer at least one question before submitting")]
    NoAnswers,

    /// The lead assignment is managed through the project itself
    #[error("the project lead assignment cannot be changed here")]
    LeadAssignment,
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
