//! # Resource workflow
//!
//! [`ResourceWorkflow`] runs every mutating action on a resource the same
//! way:
//!
//! ```text
//! validate payload ─▶ claim in-flight slot ─▶ fetch resource ─▶ gate
//!        ─▶ dispatch once ─▶ refetch ─▶ compare with expected status
//! ```
//!
//! - The gate is evaluated against freshly fetched state, never a cached
//!   copy. A refused action sends nothing.
//! - Only one mutation per resource may be pending; a second one fails fast
//!   with [`ClientError::Busy`].
//! - Mutations are never retried. After success the resource is refetched
//!   rather than patched locally; a status that differs from the state
//!   machine's expectation is logged and the server's value is kept.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use dkn_knowledge::{
    DecisionPolicy, DecisionRequest, Resource, ResourceAction, ResourceActions, ResourceId,
    ResourceStatus, ResourceUpload, Transition, UploadKind,
};
use dkn_rbac::AccessGate;

use crate::client::KnowledgeClient;
use crate::error::{ClientError, ClientResult};

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// Action that ran
    pub action: ResourceAction,

    /// Resource as refetched after the action; `None` after a delete or if
    /// the refetch failed
    pub resource: Option<Resource>,

    /// Status the state machine predicted
    pub expected_status: Option<ResourceStatus>,
}

impl ActionOutcome {
    /// Check if the refetched status differs from the prediction.
    pub fn diverged(&self) -> bool {
        match (&self.resource, self.expected_status) {
            (Some(resource), Some(expected)) => resource.status != expected,
            _ => false,
        }
    }

    /// Message to show the user.
    pub fn message(&self) -> &'static str {
        self.action.success_message()
    }
}

enum Mutation<'a> {
    Submit,
    Decide(&'a DecisionRequest),
    Publish,
    Unpublish,
    UploadVersion(&'a ResourceUpload),
    Delete,
}

impl Mutation<'_> {
    fn action(&self) -> ResourceAction {
        match self {
            Mutation::Submit => ResourceAction::Submit,
            Mutation::Decide(_) => ResourceAction::Decide,
            Mutation::Publish => ResourceAction::Publish,
            Mutation::Unpublish => ResourceAction::Unpublish,
            Mutation::UploadVersion(_) => ResourceAction::UploadVersion,
            Mutation::Delete => ResourceAction::Delete,
        }
    }

    fn transition(&self) -> Option<Transition> {
        match self {
            Mutation::Submit => Some(Transition::Submit),
            Mutation::Decide(request) => Some(Transition::Decide(request.decision)),
            Mutation::Publish => Some(Transition::Publish),
            Mutation::Unpublish => Some(Transition::Unpublish),
            Mutation::UploadVersion(_) => Some(Transition::UploadVersion),
            Mutation::Delete => None,
        }
    }
}

/// Ids with a mutation in flight.
#[derive(Debug, Default)]
struct InFlight(Mutex<HashSet<ResourceId>>);

impl InFlight {
    fn ids(&self) -> MutexGuard<'_, HashSet<ResourceId>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the in-flight slot when dropped.
struct InFlightGuard {
    in_flight: Arc<InFlight>,
    id: ResourceId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.ids().remove(&self.id);
    }
}

/// Gated, refetching runner for resource mutations.
///
/// Cloning shares the in-flight set, so clones refuse concurrent actions on
/// the same resource too.
///
/// # Example
///
/// ```rust,no_run
/// use dkn_client::{ClientConfig, KnowledgeClient, ResourceWorkflow};
/// use dkn_knowledge::{DecisionRequest, ReviewDecision};
///
/// # async fn run() -> dkn_client::ClientResult<()> {
/// let client = KnowledgeClient::connect(ClientConfig::from_env()).await?;
/// let workflow = ResourceWorkflow::new(client);
///
/// match workflow
///     .decide(42, &DecisionRequest::new(ReviewDecision::Approved, ""))
///     .await
/// {
///     Ok(outcome) => println!("{}", outcome.message()),
///     Err(e) => eprintln!("{}", workflow.failure_message(dkn_knowledge::ResourceAction::Decide, &e)),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResourceWorkflow {
    client: KnowledgeClient,
    policy: DecisionPolicy,
    in_flight: Arc<InFlight>,
}

impl ResourceWorkflow {
    /// Workflow with the default decision policy.
    pub fn new(client: KnowledgeClient) -> Self {
        Self::with_policy(client, DecisionPolicy::default())
    }

    /// Workflow with a custom decision policy.
    pub fn with_policy(client: KnowledgeClient, policy: DecisionPolicy) -> Self {
        Self {
            client,
            policy,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Underlying client.
    pub fn client(&self) -> &KnowledgeClient {
        &self.client
    }

    /// Check if a mutation on `id` is pending.
    pub fn is_in_flight(&self, id: ResourceId) -> bool {
        self.in_flight.ids().contains(&id)
    }

    /// Fetch a resource together with what the session user may do to it.
    pub async fn load(&self, id: ResourceId) -> ClientResult<(Resource, ResourceActions)> {
        let user = self.client.current_user().await?;
        let resource = self.client.get_resource(id).await?;
        let actions = ResourceActions::evaluate(&resource, &user);
        Ok((resource, actions))
    }

    /// Submit a draft for review.
    pub async fn submit(&self, id: ResourceId) -> ClientResult<ActionOutcome> {
        self.perform(id, Mutation::Submit).await
    }

    /// Record a reviewer decision.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] when the decision is not a reviewer
    /// decision or lacks a comment the policy requires.
    pub async fn decide(&self, id: ResourceId, request: &DecisionRequest) -> ClientResult<ActionOutcome> {
        self.policy.validate(request)?;
        self.perform(id, Mutation::Decide(request)).await
    }

    /// Publish an approved or unpublished resource.
    pub async fn publish(&self, id: ResourceId) -> ClientResult<ActionOutcome> {
        self.perform(id, Mutation::Publish).await
    }

    /// Withdraw a published resource.
    pub async fn unpublish(&self, id: ResourceId) -> ClientResult<ActionOutcome> {
        self.perform(id, Mutation::Unpublish).await
    }

    /// Upload a new version; the resource returns to draft.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] when no file is attached.
    pub async fn upload_version(&self, id: ResourceId, upload: &ResourceUpload) -> ClientResult<ActionOutcome> {
        upload.validate(UploadKind::NewVersion)?;
        self.perform(id, Mutation::UploadVersion(upload)).await
    }

    /// Delete a resource.
    pub async fn delete(&self, id: ResourceId) -> ClientResult<ActionOutcome> {
        self.perform(id, Mutation::Delete).await
    }

    /// Generic message for a failed action, whatever the cause.
    pub fn failure_message(&self, action: ResourceAction, error: &ClientError) -> &'static str {
        debug!(%action, kind = error.kind().as_str(), error = %error, "Action failed");
        action.failure_message()
    }

    fn claim(&self, id: ResourceId) -> ClientResult<InFlightGuard> {
        if !self.in_flight.ids().insert(id) {
            return Err(ClientError::Busy { resource_id: id });
        }
        Ok(InFlightGuard {
            in_flight: self.in_flight.clone(),
            id,
        })
    }

    #[instrument(skip(self, mutation), fields(action = %mutation.action()))]
    async fn perform(&self, id: ResourceId, mutation: Mutation<'_>) -> ClientResult<ActionOutcome> {
        let action = mutation.action();
        let _guard = self.claim(id)?;

        let user = self.client.current_user().await?;
        let resource = self.client.get_resource(id).await?;
        let gate = AccessGate::new(&user);

        if !ResourceActions::with_gate(&resource, &gate).allows(action) {
            warn!(
                resource_id = id,
                role = %user.role,
                status = %resource.status,
                "Action refused by gate"
            );
            return Err(ClientError::not_permitted(
                action.as_str(),
                format!(
                    "role {} cannot {} a resource in status {}",
                    user.role, action, resource.status
                ),
            ));
        }

        let expected_status = mutation.transition().and_then(|transition| {
            resource
                .status
                .apply(transition)
                .map_err(|e| debug!(error = %e, "No expected status for transition"))
                .ok()
        });

        if let Err(e) = self.dispatch(id, &mutation).await {
            warn!(resource_id = id, kind = e.kind().as_str(), error = %e, "{}", action.failure_message());
            return Err(e);
        }
        info!(resource_id = id, "{}", action.success_message());

        let refreshed = match mutation {
            Mutation::Delete => None,
            _ => self.refetch(id).await,
        };

        let outcome = ActionOutcome {
            action,
            resource: refreshed,
            expected_status,
        };
        if outcome.diverged() {
            warn!(
                resource_id = id,
                expected = ?outcome.expected_status,
                actual = ?outcome.resource.as_ref().map(|r| r.status),
                "Server status differs from the expected transition"
            );
        }
        Ok(outcome)
    }

    async fn dispatch(&self, id: ResourceId, mutation: &Mutation<'_>) -> ClientResult<()> {
        match mutation {
            Mutation::Submit => self.client.submit_resource(id).await,
            Mutation::Decide(request) => self.client.send_decision(id, request).await,
            Mutation::Publish => self.client.publish_resource(id).await,
            Mutation::Unpublish => self.client.unpublish_resource(id).await,
            Mutation::UploadVersion(upload) => self.client.upload_version(id, upload).await,
            Mutation::Delete => self.client.delete_resource(id).await,
        }
    }

    async fn refetch(&self, id: ResourceId) -> Option<Resource> {
        match self.client.get_resource(id).await {
            Ok(resource) => Some(resource),
            Err(e) => {
                warn!(resource_id = id, error = %e, "Refetch after action failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dkn_auth::Session;

    use crate::config::ClientConfig;

    fn workflow() -> ResourceWorkflow {
        let client = KnowledgeClient::new(ClientConfig::default(), Session::in_memory()).unwrap();
        ResourceWorkflow::new(client)
    }

    #[test]
    fn test_claim_is_exclusive_and_released() {
        let workflow = workflow();

        let guard = workflow.claim(7).unwrap();
        assert!(workflow.is_in_flight(7));
        assert!(matches!(workflow.claim(7), Err(ClientError::Busy { resource_id: 7 })));
        assert!(workflow.claim(8).is_ok());

        drop(guard);
        assert!(!workflow.is_in_flight(7));
        assert!(workflow.claim(7).is_ok());
    }

    #[test]
    fn test_clones_share_in_flight_set() {
        let workflow = workflow();
        let other = workflow.clone();

        let _guard = workflow.claim(3).unwrap();
        assert!(other.is_in_flight(3));
    }

    #[test]
    fn test_outcome_divergence() {
        let mut outcome = ActionOutcome {
            action: ResourceAction::Submit,
            resource: Some(Resource::new(1, "r", ResourceStatus::PendingReview)),
            expected_status: Some(ResourceStatus::PendingReview),
        };
        assert!(!outcome.diverged());
        assert_eq!(outcome.message(), "Resource submitted for review.");

        outcome.resource = Some(Resource::new(1, "r", ResourceStatus::Draft));
        assert!(outcome.diverged());

        outcome.resource = None;
        assert!(!outcome.diverged());
    }

    #[test]
    fn test_mutation_transitions() {
        let upload = ResourceUpload::default();
        assert_eq!(
            Mutation::UploadVersion(&upload).transition(),
            Some(Transition::UploadVersion)
        );
        assert_eq!(Mutation::Delete.transition(), None);
        assert_eq!(Mutation::Delete.action(), ResourceAction::Delete);
    }

    #[tokio::test]
    async fn test_validation_happens_before_anything_is_sent() {
        use dkn_knowledge::ReviewDecision;

        // No session user and no server: validation must fail first.
        let workflow = workflow();
        let missing_comment = DecisionRequest::new(ReviewDecision::Flagged, "  ");
        assert!(matches!(
            workflow.decide(1, &missing_comment).await,
            Err(ClientError::Validation(_))
        ));

        let no_file = ResourceUpload::default().notes("v2");
        assert!(matches!(
            workflow.upload_version(1, &no_file).await,
            Err(ClientError::Validation(_))
        ));
        assert!(!workflow.is_in_flight(1));
    }
}
