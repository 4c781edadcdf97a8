//! Knowledge endpoints.
//!
//! Reads and the new-resource upload are public. The per-resource mutations
//! (submit, decide, publish, unpublish, new version, delete) are crate
//! private: callers go through [`ResourceWorkflow`](crate::ResourceWorkflow),
//! which gates, dispatches and refetches.

use reqwest::Method;
use tracing::{debug, instrument};

use dkn_knowledge::{
    DecisionRequest, Region, Resource, ResourceId, ResourceUpload, ReviewRecord, UploadKind,
};

use crate::client::{ensure_permitted, FormData, KnowledgeClient, Payload};
use crate::error::ClientResult;

fn resource_path(id: ResourceId) -> String {
    format!("/knowledge/resources/{}/", id)
}

fn resource_action_path(id: ResourceId, action: &str) -> String {
    format!("/knowledge/resources/{}/{}/", id, action)
}

impl KnowledgeClient {
    /// Fetch one resource with its versions, review steps and AI flags.
    #[instrument(skip(self))]
    pub async fn get_resource(&self, id: ResourceId) -> ClientResult<Resource> {
        debug!("Fetching resource {}", id);
        self.get(&resource_path(id)).await
    }

    /// Resources uploaded by the session user.
    pub async fn my_resources(&self) -> ClientResult<Vec<Resource>> {
        self.get_list("/knowledge/resources/mine/").await
    }

    /// Resources that are currently published.
    pub async fn published_resources(&self) -> ClientResult<Vec<Resource>> {
        self.get_list("/knowledge/resources/published/").await
    }

    /// Resources awaiting a decision at the reviewer's stage.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotPermitted`](crate::ClientError::NotPermitted) for roles that do not review.
    pub async fn review_queue(&self) -> ClientResult<Vec<Resource>> {
        let gate = self.gate().await?;
        ensure_permitted(gate.can_view_review_queue(), "view review queue", || {
            format!("role {} does not review", gate.role())
        })?;
        self.get_list("/knowledge/review-queue/").await
    }

    /// Decisions the session user has recorded as a reviewer.
    pub async fn my_review_actions(&self) -> ClientResult<Vec<ReviewRecord>> {
        let gate = self.gate().await?;
        ensure_permitted(gate.can_view_review_queue(), "view review actions", || {
            format!("role {} does not review", gate.role())
        })?;
        self.get_list("/knowledge/review-actions/mine/").await
    }

    /// Regions offered by the upload and project forms.
    pub async fn regions(&self) -> ClientResult<Vec<Region>> {
        self.get_list("/accounts/regions/").await
    }

    /// Upload a new resource as a draft.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotPermitted`](crate::ClientError::NotPermitted) unless the role may upload
    /// - [`ClientError::Validation`](crate::ClientError::Validation) when the title or file is missing
    #[instrument(skip(self, upload), fields(title = %upload.title))]
    pub async fn upload_resource(&self, upload: &ResourceUpload) -> ClientResult<Resource> {
        let gate = self.gate().await?;
        ensure_permitted(gate.can_upload_resource(), "upload", || {
            format!("role {} cannot upload resources", gate.role())
        })?;
        upload.validate(UploadKind::NewResource)?;

        let form = FormData::from_upload(upload, UploadKind::NewResource);
        self.mutate(Method::POST, "/knowledge/upload/", Payload::Form(form))
            .await
    }

    pub(crate) async fn submit_resource(&self, id: ResourceId) -> ClientResult<()> {
        self.execute(Method::POST, &resource_action_path(id, "submit"), Payload::Empty)
            .await
    }

    pub(crate) async fn send_decision(&self, id: ResourceId, request: &DecisionRequest) -> ClientResult<()> {
        self.execute(
            Method::POST,
            &resource_action_path(id, "decision"),
            Payload::json(request)?,
        )
        .await
    }

    pub(crate) async fn publish_resource(&self, id: ResourceId) -> ClientResult<()> {
        self.execute(Method::POST, &resource_action_path(id, "publish"), Payload::Empty)
            .await
    }

    pub(crate) async fn unpublish_resource(&self, id: ResourceId) -> ClientResult<()> {
        self.execute(Method::POST, &resource_action_path(id, "unpublish"), Payload::Empty)
            .await
    }

    pub(crate) async fn upload_version(&self, id: ResourceId, upload: &ResourceUpload) -> ClientResult<()> {
        let form = FormData::from_upload(upload, UploadKind::NewVersion);
        self.execute(
            Method::POST,
            &resource_action_path(id, "versions"),
            Payload::Form(form),
        )
        .await
    }

    pub(crate) async fn delete_resource(&self, id: ResourceId) -> ClientResult<()> {
        self.execute(Method::DELETE, &resource_path(id), Payload::Empty)
            .await
    }
}
