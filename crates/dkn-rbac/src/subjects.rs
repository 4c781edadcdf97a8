//! # Subjects
//!
//! Defines every kind of thing a capability can be granted on, grouped by
//! the area of the DKN front end that owns it.

use serde::{Deserialize, Serialize};

/// Functional area a subject belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    /// Knowledge resources and their review pipeline.
    Knowledge,
    /// Collaboration projects, workspaces and posts.
    Collab,
    /// Training courses, quizzes and leaderboards.
    Training,
}

impl Area {
    /// Get the string representation of the area.
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Knowledge => "knowledge",
            Area::Collab => "collab",
            Area::Training => "training",
        }
    }
}

/// Subjects that can have permissions assigned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    // Knowledge
    /// An uploaded knowledge resource.
    Resource,
    /// A review decision on a resource.
    Review,
    /// The queue of resources awaiting review.
    ReviewQueue,

    // Collaboration
    /// A collaboration project.
    Project,
    /// A workspace ("space") inside a project.
    Workspace,
    /// A post inside a workspace.
    Post,

    // Training
    /// A training course.
    Course,
    /// The quiz attached to a course.
    Quiz,
    /// Per-course quiz leaderboard.
    Leaderboard,
}

impl Subject {
    /// Get the string representation of the subject.
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Resource => "resource",
            Subject::Review => "review",
            Subject::ReviewQueue => "review_queue",
            Subject::Project => "project",
            Subject::Workspace => "workspace",
            Subject::Post => "post",
            Subject::Course => "course",
            Subject::Quiz => "quiz",
            Subject::Leaderboard => "leaderboard",
        }
    }

    /// Parse subject from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "resource" | "resources" => Some(Subject::Resource),
            "review" | "reviews" => Some(Subject::Review),
            "review_queue" | "review-queue" => Some(Subject::ReviewQueue),
            "project" | "projects" => Some(Subject::Project),
            "workspace" | "space" | "spaces" => Some(Subject::Workspace),
            "post" | "posts" => Some(Subject::Post),
            "course" | "courses" => Some(Subject::Course),
            "quiz" => Some(Subject::Quiz),
            "leaderboard" => Some(Subject::Leaderboard),
            _ => None,
        }
    }

    /// Get the area that owns this subject.
    ///
    /// # Example
    ///
    /// ```
    /// use dkn_rbac::subjects::{Area, Subject};
    ///
    /// assert_eq!(Subject::Review.area(), Area::Knowledge);
    /// assert_eq!(Subject::Post.area(), Area::Collab);
    /// assert_eq!(Subject::Quiz.area(), Area::Training);
    /// ```
    pub fn area(&self) -> Area {
        match self {
            Subject::Resource | Subject::Review | Subject::ReviewQueue => Area::Knowledge,
            Subject::Project | Subject::Workspace | Subject::Post => Area::Collab,
            Subject::Course | Subject::Quiz | Subject::Leaderboard => Area::Training,
        }
    }

    /// Get all subjects.
    pub fn all() -> Vec<Self> {
        vec![
            Subject::Resource,
            Subject::Review,
            Subject::ReviewQueue,
            Subject::Project,
            Subject::Workspace,
            Subject::Post,
            Subject::Course,
            Subject::Quiz,
            Subject::Leaderboard,
        ]
    }

    /// Get all subjects in an area.
    pub fn for_area(area: Area) -> Vec<Self> {
        Self::all().into_iter().filter(|s| s.area() == area).collect()
    }
}
