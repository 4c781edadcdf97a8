//! # Review log
//!
//! Review steps form an append-only event log per resource. Nothing about
//! publication is stored on the resource itself: the effective
//! [`PublishState`] is always recomputed from the log by [`ReviewLog`].
//!
//! ## Ordering
//!
//! Steps are ordered by `(created_at, id)`. A missing timestamp orders as
//! the Unix epoch. When two publish/unpublish steps share a timestamp the
//! higher step id wins; steps equal on both keep "last in the log wins".
//! This makes the derived state independent of the order the server lists
//! the steps in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{ValidationError, ValidationResult};
use crate::resource::ResourceId;
use crate::status::{PublishState, ResourceStatus, ReviewDecision, Stage};

/// One recorded decision in a resource's review log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewStep {
    /// Step ID
    pub id: i64,

    /// Stage the decision was taken at
    #[serde(default)]
    pub stage: Option<Stage>,

    /// The decision
    pub decision: ReviewDecision,

    /// Version the decision applies to
    #[serde(default)]
    pub version_number: Option<u32>,

    /// Reviewer's display name
    #[serde(default)]
    pub reviewer_name: Option<String>,

    /// Reviewer comment
    #[serde(default)]
    pub comment: Option<String>,

    /// When the decision was recorded
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ReviewStep {
    /// Create a step with only the fields the lifecycle engine reads.
    pub fn new(id: i64, decision: ReviewDecision, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            stage: None,
            decision,
            version_number: None,
            reviewer_name: None,
            comment: None,
            created_at,
        }
    }

    /// Timestamp used for ordering; missing timestamps count as the epoch.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(DateTime::UNIX_EPOCH)
    }

    fn order_key(&self) -> (DateTime<Utc>, i64) {
        (self.timestamp(), self.id)
    }
}

/// Read-only view over a resource's review steps.
#[derive(Debug, Clone, Copy)]
pub struct ReviewLog<'a> {
    steps: &'a [ReviewStep],
}

impl<'a> ReviewLog<'a> {
    /// Wrap a slice of steps.
    pub fn new(steps: &'a [ReviewStep]) -> Self {
        Self { steps }
    }

    /// Steps as the server listed them.
    pub fn steps(&self) -> &'a [ReviewStep] {
        self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The latest PUBLISHED/UNPUBLISHED step, if any.
    pub fn latest_publication(&self) -> Option<&'a ReviewStep> {
        self.latest_matching(|step| step.decision.is_publication())
    }

    /// The latest reviewer decision (approve, reject, flag, request changes).
    pub fn latest_review(&self) -> Option<&'a ReviewStep> {
        self.latest_matching(|step| step.decision.is_reviewer_decision())
    }

    /// Effective publish state.
    ///
    /// # Examples
    ///
    /// ```
    /// use dkn_knowledge::{PublishState, ReviewDecision, ReviewLog, ReviewStep};
    ///
    /// assert_eq!(ReviewLog::new(&[]).publish_state(), PublishState::NeverPublished);
    ///
    /// let steps = [ReviewStep::new(1, ReviewDecision::Published, None)];
    /// assert_eq!(ReviewLog::new(&steps).publish_state(), PublishState::Published);
    /// ```
    pub fn publish_state(&self) -> PublishState {
        match self.latest_publication().map(|step| step.decision) {
            Some(ReviewDecision::Published) => PublishState::Published,
            Some(_) => PublishState::Unpublished,
            None => PublishState::NeverPublished,
        }
    }

    /// Steps ordered by timestamp. Steps sharing a timestamp keep log order.
    pub fn chronological(&self) -> Vec<&'a ReviewStep> {
        let mut steps: Vec<&'a ReviewStep> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.timestamp());
        steps
    }

    /// Chronological steps for one version, or all of them for `None`.
    pub fn for_version(&self, version: Option<u32>) -> Vec<&'a ReviewStep> {
        self.chronological()
            .into_iter()
            .filter(|step| version.is_none() || step.version_number == version)
            .collect()
    }

    /// Distinct version numbers that appear in the log, ascending.
    pub fn versions_reviewed(&self) -> Vec<u32> {
        self.steps
            .iter()
            .filter_map(|step| step.version_number)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn latest_matching<F>(&self, predicate: F) -> Option<&'a ReviewStep>
    where
        F: Fn(&ReviewStep) -> bool,
    {
        let mut latest: Option<&'a ReviewStep> = None;
        for step in self.steps.iter().filter(|step| predicate(step)) {
            match latest {
                Some(current) if step.order_key() < current.order_key() => {}
                _ => latest = Some(step),
            }
        }
        latest
    }
}

/// Which reviewer decisions must carry a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    /// Decisions rejected without a non-blank comment
    pub comment_required: Vec<ReviewDecision>,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            comment_required: vec![ReviewDecision::Flagged, ReviewDecision::ChangesRequested],
        }
    }
}

impl DecisionPolicy {
    /// A policy that never requires comments.
    pub fn lenient() -> Self {
        Self {
            comment_required: Vec::new(),
        }
    }

    /// Check if `decision` needs a comment under this policy.
    pub fn requires_comment(&self, decision: ReviewDecision) -> bool {
        self.comment_required.contains(&decision)
    }

    /// Validate a decision payload.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NotReviewerDecision`] for PUBLISHED/UNPUBLISHED
    /// - [`ValidationError::CommentRequired`] when the comment is blank and
    ///   the policy requires one
    pub fn validate(&self, request: &DecisionRequest) -> ValidationResult<()> {
        if !request.decision.is_reviewer_decision() {
            return Err(ValidationError::NotReviewerDecision(request.decision));
        }
        if self.requires_comment(request.decision) && request.comments.trim().is_empty() {
            return Err(ValidationError::CommentRequired(request.decision));
        }
        Ok(())
    }
}

/// Body of `POST /knowledge/resources/{id}/decision/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// Reviewer decision
    pub decision: ReviewDecision,
    /// Reviewer comment (may be empty)
    #[serde(default)]
    pub comments: String,
}

impl DecisionRequest {
    /// Build a decision payload.
    pub fn new(decision: ReviewDecision, comments: impl Into<String>) -> Self {
        Self {
            decision,
            comments: comments.into(),
        }
    }
}

/// One entry of the reviewer's own action history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewRecord {
    /// Step ID
    pub id: i64,

    /// Resource the decision was taken on
    pub resource_id: ResourceId,

    /// Resource title
    #[serde(default)]
    pub title: String,

    /// Resource region
    #[serde(default)]
    pub region: Option<String>,

    /// Current resource status
    #[serde(default)]
    pub status: Option<ResourceStatus>,

    /// Decision the reviewer recorded
    pub decision: ReviewDecision,

    /// Comment the reviewer left
    #[serde(default)]
    pub comment: Option<String>,

    /// Version the decision applied to
    #[serde(default)]
    pub version_number: Option<u32>,

    /// File that was reviewed
    #[serde(default, alias = "submitted_file")]
    pub file: Option<String>,

    /// When the decision was recorded
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single()
    }

    fn step(id: i64, decision: ReviewDecision, t: Option<DateTime<Utc>>) -> ReviewStep {
        ReviewStep::new(id, decision, t)
    }

    #[test]
    fn test_empty_log_never_published() {
        assert_eq!(ReviewLog::new(&[]).publish_state(), PublishState::NeverPublished);
    }

    #[test]
    fn test_single_publish() {
        let steps = [step(1, ReviewDecision::Published, at(1))];
        assert_eq!(ReviewLog::new(&steps).publish_state(), PublishState::Published);
    }

    #[test]
    fn test_later_unpublish_wins() {
        let steps = [
            step(1, ReviewDecision::Published, at(1)),
            step(2, ReviewDecision::Unpublished, at(2)),
        ];
        assert_eq!(ReviewLog::new(&steps).publish_state(), PublishState::Unpublished);
    }

    #[test]
    fn test_latest_by_timestamp_not_position() {
        let steps = [
            step(2, ReviewDecision::Unpublished, at(2)),
            step(1, ReviewDecision::Published, at(1)),
        ];
        assert_eq!(ReviewLog::new(&steps).publish_state(), PublishState::Unpublished);
    }

    #[test]
    fn test_reviewer_decisions_ignored() {
        let steps = [
            step(1, ReviewDecision::Approved, at(1)),
            step(2, ReviewDecision::Published, at(2)),
            step(3, ReviewDecision::Rejected, at(3)),
        ];
        let log = ReviewLog::new(&steps);
        assert_eq!(log.publish_state(), PublishState::Published);
        assert_eq!(log.latest_review().map(|s| s.id), Some(3));
    }

    #[test]
    fn test_missing_timestamp_orders_first() {
        let steps = [
            step(9, ReviewDecision::Unpublished, None),
            step(1, ReviewDecision::Published, at(0)),
        ];
        assert_eq!(ReviewLog::new(&steps).publish_state(), PublishState::Published);
    }

    #[test]
    fn test_equal_timestamps_higher_id_wins_in_any_order() {
        let forward = [
            step(1, ReviewDecision::Published, at(5)),
            step(2, ReviewDecision::Unpublished, at(5)),
        ];
        let backward = [forward[1].clone(), forward[0].clone()];

        assert_eq!(ReviewLog::new(&forward).publish_state(), PublishState::Unpublished);
        assert_eq!(ReviewLog::new(&backward).publish_state(), PublishState::Unpublished);
    }

    #[test]
    fn test_order_independence_over_permutations() {
        let steps = vec![
            step(1, ReviewDecision::Published, at(1)),
            step(2, ReviewDecision::Unpublished, at(3)),
            step(3, ReviewDecision::Published, at(3)),
            step(4, ReviewDecision::Approved, at(9)),
            step(5, ReviewDecision::Unpublished, None),
        ];
        let expected = ReviewLog::new(&steps).publish_state();
        assert_eq!(expected, PublishState::Published);

        // Every rotation and its reverse.
        for shift in 0..steps.len() {
            let mut rotated = steps.clone();
            rotated.rotate_left(shift);
            assert_eq!(ReviewLog::new(&rotated).publish_state(), expected);
            rotated.reverse();
            assert_eq!(ReviewLog::new(&rotated).publish_state(), expected);
        }
    }

    #[test]
    fn test_chronological_and_version_filter() {
        let mut a = step(1, ReviewDecision::Approved, at(3));
        a.version_number = Some(2);
        let mut b = step(2, ReviewDecision::ChangesRequested, at(1));
        b.version_number = Some(1);
        let mut c = step(3, ReviewDecision::Approved, at(2));
        c.version_number = Some(2);
        let steps = [a, b, c];
        let log = ReviewLog::new(&steps);

        let ids: Vec<i64> = log.chronological().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let v2: Vec<i64> = log.for_version(Some(2)).iter().map(|s| s.id).collect();
        assert_eq!(v2, vec![3, 1]);
        assert_eq!(log.for_version(None).len(), 3);
        assert_eq!(log.versions_reviewed(), vec![1, 2]);
    }

    #[test]
    fn test_chronological_is_stable_for_ties() {
        let steps = [
            step(7, ReviewDecision::Approved, at(1)),
            step(3, ReviewDecision::Flagged, at(1)),
        ];
        let ids: Vec<i64> = ReviewLog::new(&steps).chronological().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![7, 3]);
    }

    #[test]
    fn test_policy_requires_comment() {
        let policy = DecisionPolicy::default();

        assert!(policy.validate(&DecisionRequest::new(ReviewDecision::Approved, "")).is_ok());
        assert!(policy.validate(&DecisionRequest::new(ReviewDecision::Rejected, "")).is_ok());
        assert_eq!(
            policy.validate(&DecisionRequest::new(ReviewDecision::Flagged, "  ")),
            Err(ValidationError::CommentRequired(ReviewDecision::Flagged))
        );
        assert!(policy
            .validate(&DecisionRequest::new(ReviewDecision::ChangesRequested, "Fix section 2"))
            .is_ok());
    }

    #[test]
    fn test_policy_rejects_publication_decisions() {
        let policy = DecisionPolicy::lenient();
        assert_eq!(
            policy.validate(&DecisionRequest::new(ReviewDecision::Published, "ok")),
            Err(ValidationError::NotReviewerDecision(ReviewDecision::Published))
        );
        assert!(policy.validate(&DecisionRequest::new(ReviewDecision::Flagged, "")).is_ok());
    }

    #[test]
    fn test_decision_request_body() {
        let body = serde_json::to_value(DecisionRequest::new(ReviewDecision::ChangesRequested, "More detail")).unwrap();
        assert_eq!(body, serde_json::json!({"decision": "CHANGES_REQUESTED", "comments": "More detail"}));
    }

    #[test]
    fn test_review_record_accepts_submitted_file() {
        let record: ReviewRecord = serde_json::from_value(serde_json::json!({
            "id": 1,
            "resource_id": 4,
            "title": "Guide",
            "status": "PENDING_REVIEW",
            "decision": "APPROVED",
            "submitted_file": "/media/g.pdf"
        }))
        .unwrap();
        assert_eq!(record.file.as_deref(), Some("/media/g.pdf"));
        assert_eq!(record.status, Some(ResourceStatus::PendingReview));
    }
}
