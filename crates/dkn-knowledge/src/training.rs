//! # Training courses and quizzes
//!
//! Champions create courses and manage the materials and quiz of the
//! courses they created; employees take quizzes and appear on per-course
//! leaderboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dkn_rbac::{Ownership, User, UserId};

use crate::error::{ValidationError, ValidationResult};

/// Server-assigned course identifier.
pub type CourseId = i64;

/// A training course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    /// Course ID
    pub id: CourseId,

    /// Title
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Region
    #[serde(default)]
    pub region: Option<String>,

    /// Status label (e.g. "PUBLISHED", "DRAFT")
    #[serde(default)]
    pub status: Option<String>,

    /// Creator's user id, when the server includes it
    #[serde(default, deserialize_with = "crate::wire::optional_user_id")]
    pub created_by: Option<UserId>,

    /// Creator's username
    #[serde(default)]
    pub created_by_name: Option<String>,

    /// Course materials (detail endpoint only)
    #[serde(default)]
    pub materials: Vec<Material>,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Last update
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Create a course with only an id and a title.
    pub fn new(id: CourseId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            region: None,
            status: None,
            created_by: None,
            created_by_name: None,
            materials: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Whether `user` created this course.
    ///
    /// Matched by creator id when present, otherwise by creator username.
    ///
    /// # Examples
    ///
    /// ```
    /// use dkn_knowledge::training::Course;
    /// use dkn_rbac::{Ownership, Role, User};
    ///
    /// let champion = User::new(5, "amira", Role::Champion);
    /// let mut course = Course::new(1, "Data hygiene");
    /// course.created_by_name = Some("amira".into());
    ///
    /// assert_eq!(course.creator_ownership(&champion), Ownership::Owner);
    /// ```
    pub fn creator_ownership(&self, user: &User) -> Ownership {
        match self.created_by {
            Some(_) => Ownership::of(user, self.created_by),
            None => Ownership::of_username(user, self.created_by_name.as_deref()),
        }
    }
}

/// A course material: an uploaded file or an external link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Material {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
}

/// Body of `POST /training/courses/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub region: String,
    #[serde(default = "NewCourse::default_status")]
    pub status: String,
}

impl NewCourse {
    fn default_status() -> String {
        "PUBLISHED".to_string()
    }

    /// Start a course payload.
    pub fn new(title: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            region: region.into(),
            status: Self::default_status(),
            ..Self::default()
        }
    }

    /// Check the required fields.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.region.trim().is_empty() {
            return Err(ValidationError::MissingField("region"));
        }
        Ok(())
    }
}

/// One answer option of a quiz question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizOption {
    pub id: i64,
    pub text: String,
    /// Only present in the management view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

/// A quiz question with its options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub options: Vec<QuizOption>,
}

/// Body of `POST /training/courses/{id}/questions/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewQuestion {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl NewQuestion {
    /// A question with trimmed text.
    pub fn new(text: impl AsRef<str>, order: Option<i32>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            order,
        }
    }

    /// Check the required fields.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.text.is_empty() {
            return Err(ValidationError::MissingField("question text"));
        }
        Ok(())
    }
}

/// Body of `POST /training/courses/{id}/questions/{qid}/options/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewOption {
    pub text: String,
    pub is_correct: bool,
}

impl NewOption {
    /// An option with trimmed text.
    pub fn new(text: impl AsRef<str>, is_correct: bool) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            is_correct,
        }
    }

    /// Check the required fields.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.text.is_empty() {
            return Err(ValidationError::MissingField("option text"));
        }
        Ok(())
    }
}

/// One selected option.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizAnswer {
    pub question: i64,
    pub option: i64,
}

/// Body of `POST /training/courses/{id}/quiz/submit/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizSubmission {
    pub answers: Vec<QuizAnswer>,
}

impl QuizSubmission {
    /// Build a submission from `(question, option)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        Self {
            answers: pairs
                .into_iter()
                .map(|(question, option)| QuizAnswer { question, option })
                .collect(),
        }
    }

    /// At least one question must be answered.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.answers.is_empty() {
            return Err(ValidationError::NoAnswers);
        }
        Ok(())
    }
}

/// Score returned after submitting a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizResult {
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub percent: f64,
    #[serde(default, alias = "is_passed")]
    pub passed: bool,
}

/// One of the user's past quiz attempts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizAttempt {
    #[serde(default)]
    pub id: i64,
    pub course: CourseId,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub is_passed: bool,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One row of a course leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub rank: u32,
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub is_passed: bool,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Attempts belonging to one course.
pub fn attempts_for_course(attempts: &[QuizAttempt], course: CourseId) -> Vec<&QuizAttempt> {
    attempts.iter().filter(|a| a.course == course).collect()
}
