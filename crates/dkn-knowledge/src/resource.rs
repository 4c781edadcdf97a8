//! # Resource domain model
//!
//! A [`Resource`] is one unit of uploaded knowledge content together with
//! its immutable [`Version`]s, its append-only review log and the
//! informational [`AiFlag`]s raised by automated checks.
//!
//! The same record shape comes back from detail and listing endpoints;
//! listings simply omit the nested collections, so every collection field
//! defaults to empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use dkn_rbac::{Ownership, User, UserId};

use crate::review::{ReviewLog, ReviewStep};
use crate::status::{PublishState, ResourceStatus, Stage};

/// Server-assigned resource identifier.
pub type ResourceId = i64;

/// A knowledge resource as returned by the API.
///
/// # Examples
///
/// ```
/// use dkn_knowledge::{PublishState, Resource, ResourceStatus};
///
/// let resource = Resource::new(1, "Onboarding guide", ResourceStatus::Draft);
/// assert_eq!(resource.publish_state(), PublishState::NeverPublished);
/// assert!(resource.latest_version().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Resource ID
    pub id: ResourceId,

    /// Title
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,

    /// Region the resource applies to
    #[serde(default)]
    pub region: Option<String>,

    /// Coarse lifecycle status
    pub status: ResourceStatus,

    /// Pipeline stage, independent from `status`
    #[serde(default)]
    pub current_stage: Option<Stage>,

    /// Uploaded versions (immutable once created)
    #[serde(default)]
    pub versions: Vec<Version>,

    /// Review event log (append-only)
    #[serde(default)]
    pub review_steps: Vec<ReviewStep>,

    /// Automated-check findings; informational only
    #[serde(default)]
    pub ai_flags: Vec<AiFlag>,

    /// Uploader's user id, when the server includes it
    #[serde(default, deserialize_with = "crate::wire::optional_user_id")]
    pub uploaded_by: Option<UserId>,

    /// Tags, sent either as a list or as one comma-separated string
    #[serde(default, alias = "tags_display", deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,

    /// Free-form metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// File of the most recent version
    #[serde(default)]
    pub latest_file: Option<String>,

    /// When the resource was first submitted for review
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,

    /// When the resource was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// When the resource was last updated
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource {
    /// Create a bare resource with no versions, steps or flags.
    pub fn new(id: ResourceId, title: impl Into<String>, status: ResourceStatus) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            region: None,
            status,
            current_stage: None,
            versions: Vec::new(),
            review_steps: Vec::new(),
            ai_flags: Vec::new(),
            uploaded_by: None,
            tags: Vec::new(),
            metadata: serde_json::Map::new(),
            latest_file: None,
            submitted_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Set the pipeline stage.
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.current_stage = Some(stage);
        self
    }

    /// Set the uploader.
    pub fn with_uploader(mut self, user_id: UserId) -> Self {
        self.uploaded_by = Some(user_id);
        self
    }

    /// Append a review step.
    pub fn with_step(mut self, step: ReviewStep) -> Self {
        self.review_steps.push(step);
        self
    }

    /// View of the review log.
    pub fn review_log(&self) -> ReviewLog<'_> {
        ReviewLog::new(&self.review_steps)
    }

    /// Effective publish state, recomputed from the review log.
    pub fn publish_state(&self) -> PublishState {
        self.review_log().publish_state()
    }

    /// Check if the resource sits at the given stage.
    pub fn is_at_stage(&self, stage: &Stage) -> bool {
        self.current_stage.as_ref() == Some(stage)
    }

    /// Whether `user` uploaded this resource.
    pub fn uploader_ownership(&self, user: &User) -> Ownership {
        Ownership::of(user, self.uploaded_by)
    }

    /// Versions ordered by version number, oldest first.
    pub fn sorted_versions(&self) -> Vec<&Version> {
        let mut versions: Vec<&Version> = self.versions.iter().collect();
        versions.sort_by_key(|v| v.version_number);
        versions
    }

    /// The highest-numbered version.
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.iter().max_by_key(|v| v.version_number)
    }

    /// AI flags ordered by severity, most severe first.
    pub fn flags_by_severity(&self) -> Vec<&AiFlag> {
        let mut flags: Vec<&AiFlag> = self.ai_flags.iter().collect();
        flags.sort_by(|a, b| b.severity.cmp(&a.severity));
        flags
    }
}

/// One uploaded version of a resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    /// Version ID
    #[serde(default)]
    pub id: i64,

    /// Monotonic per resource, starting at 1
    pub version_number: u32,

    /// Download reference of the uploaded file
    #[serde(default)]
    pub file: Option<String>,

    /// Uploader's user id
    #[serde(default, deserialize_with = "crate::wire::optional_user_id")]
    pub created_by: Option<UserId>,

    /// Uploader's username
    #[serde(default)]
    pub created_by_name: Option<String>,

    /// Upload time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Notes left with the upload
    #[serde(default)]
    pub notes: Option<String>,
}

/// Severity of an automated-check finding.
///
/// Ordered `Low < Medium < High`. Unknown severities read as `Low`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    /// Wire name of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

impl From<String> for Severity {
    fn from(label: String) -> Self {
        match label.as_str() {
            "HIGH" => Severity::High,
            "MEDIUM" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

/// A finding from the automated content checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiFlag {
    /// Flag ID
    #[serde(default)]
    pub id: i64,

    /// Kind of check that raised the flag (e.g. "PII", "DUPLICATE")
    #[serde(default)]
    pub flag_type: String,

    /// How serious the finding is
    #[serde(default)]
    pub severity: Severity,

    /// Human-readable explanation
    #[serde(default)]
    pub message: String,

    /// Version the check ran against
    #[serde(default)]
    pub version_number: Option<u32>,

    /// When the flag was raised
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A selectable region from `GET /accounts/regions/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    /// Wire value (e.g. "EU", "GLOBAL")
    pub value: String,
    /// Display label
    pub label: String,
}

/// Accept tags as `["a","b"]`, `"a, b"` or `null`.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Joined(String),
    }

    let tags = Option::<Tags>::deserialize(deserializer)?;
    Ok(match tags {
        Some(Tags::List(list)) => list,
        Some(Tags::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    })
}
