//! Training endpoints: courses, materials, quizzes and leaderboards.
//!
//! Course creation needs the Champion role; materials and quiz questions are
//! managed only by the Champion who created the course. Quizzes are taken
//! by employees.

use reqwest::Method;
use tracing::instrument;

use dkn_knowledge::training::{
    Course, CourseId, LeaderboardEntry, Material, NewCourse, NewOption, NewQuestion, Question,
    QuizAttempt, QuizOption, QuizResult, QuizSubmission,
};
use dkn_knowledge::{FileUpload, ValidationError};
use dkn_rbac::{AccessGate, Ownership};

use crate::client::{ensure_permitted, FormData, KnowledgeClient, Payload};
use crate::error::ClientResult;

fn course_path(id: CourseId) -> String {
    format!("/training/courses/{}/", id)
}

fn question_path(course: CourseId, question: i64) -> String {
    format!("/training/courses/{}/questions/{}/", course, question)
}

impl KnowledgeClient {
    /// All courses.
    pub async fn list_courses(&self) -> ClientResult<Vec<Course>> {
        self.get_list("/training/courses/").await
    }

    /// Fetch one course with its materials.
    pub async fn get_course(&self, id: CourseId) -> ClientResult<Course> {
        self.get(&course_path(id)).await
    }

    /// Create a course. Champion only.
    #[instrument(skip(self, course), fields(title = %course.title))]
    pub async fn create_course(&self, course: &NewCourse) -> ClientResult<Course> {
        let gate = self.gate().await?;
        ensure_permitted(gate.can_create_course(), "create course", || {
            format!("role {} cannot create courses", gate.role())
        })?;
        course.validate()?;

        self.mutate(Method::POST, "/training/courses/", Payload::json(course)?)
            .await
    }

    /// Attach a file to a course. Course creator only.
    #[instrument(skip(self, file))]
    pub async fn upload_material(&self, course: CourseId, title: &str, file: FileUpload) -> ClientResult<Material> {
        if title.trim().is_empty() {
            return Err(ValidationError::MissingField("title").into());
        }
        self.require_course_owner(course, "upload material", AccessGate::can_manage_course)
            .await?;

        let form = FormData::new().text("title", title.trim()).file("file", file);
        self.mutate(
            Method::POST,
            &format!("/training/courses/{}/materials/", course),
            Payload::Form(form),
        )
        .await
    }

    /// Remove a material from a course. Course creator only.
    #[instrument(skip(self))]
    pub async fn delete_material(&self, course: CourseId, material: i64) -> ClientResult<()> {
        self.require_course_owner(course, "delete material", AccessGate::can_manage_course)
            .await?;

        self.execute(
            Method::DELETE,
            &format!("/training/materials/{}/", material),
            Payload::Empty,
        )
        .await
    }

    /// Quiz questions as shown to a learner (no correct answers).
    pub async fn get_quiz(&self, course: CourseId) -> ClientResult<Vec<Question>> {
        self.get_list(&format!("/training/courses/{}/quiz/", course))
            .await
    }

    /// Submit quiz answers. Employees only.
    #[instrument(skip(self, submission), fields(answers = submission.answers.len()))]
    pub async fn submit_quiz(&self, course: CourseId, submission: &QuizSubmission) -> ClientResult<QuizResult> {
        let gate = self.gate().await?;
        ensure_permitted(gate.can_take_quiz(), "take quiz", || {
            format!("role {} does not take quizzes", gate.role())
        })?;
        submission.validate()?;

        self.mutate(
            Method::POST,
            &format!("/training/courses/{}/quiz/submit/", course),
            Payload::json(submission)?,
        )
        .await
    }

    /// The session user's past attempts across all courses. Employees only.
    pub async fn my_attempts(&self) -> ClientResult<Vec<QuizAttempt>> {
        let gate = self.gate().await?;
        ensure_permitted(gate.can_take_quiz(), "view attempts", || {
            format!("role {} does not take quizzes", gate.role())
        })?;
        self.get_list("/training/my-attempts/").await
    }

    /// Best attempts for a course, ranked.
    pub async fn leaderboard(&self, course: CourseId) -> ClientResult<Vec<LeaderboardEntry>> {
        self.get_list(&format!("/training/courses/{}/leaderboard/", course))
            .await
    }

    /// Questions with their correct answers, for the course creator.
    pub async fn manage_questions(&self, course: CourseId) -> ClientResult<Vec<Question>> {
        self.require_course_owner(course, "manage quiz", AccessGate::can_manage_quiz)
            .await?;
        self.get_list(&format!("/training/courses/{}/questions/", course))
            .await
    }

    /// Add a quiz question. Course creator only.
    #[instrument(skip(self, question))]
    pub async fn add_question(&self, course: CourseId, question: &NewQuestion) -> ClientResult<Question> {
        question.validate()?;
        self.require_course_owner(course, "add question", AccessGate::can_manage_quiz)
            .await?;

        self.mutate(
            Method::POST,
            &format!("/training/courses/{}/questions/", course),
            Payload::json(question)?,
        )
        .await
    }

    /// Delete a quiz question. Course creator only.
    #[instrument(skip(self))]
    pub async fn delete_question(&self, course: CourseId, question: i64) -> ClientResult<()> {
        self.require_course_owner(course, "delete question", AccessGate::can_manage_quiz)
            .await?;

        self.execute(Method::DELETE, &question_path(course, question), Payload::Empty)
            .await
    }

    /// Add an answer option to a question. Course creator only.
    #[instrument(skip(self, option))]
    pub async fn add_option(&self, course: CourseId, question: i64, option: &NewOption) -> ClientResult<QuizOption> {
        option.validate()?;
        self.require_course_owner(course, "add option", AccessGate::can_manage_quiz)
            .await?;

        self.mutate(
            Method::POST,
            &format!("{}options/", question_path(course, question)),
            Payload::json(option)?,
        )
        .await
    }

    /// Delete an answer option. Course creator only.
    #[instrument(skip(self))]
    pub async fn delete_option(&self, course: CourseId, question: i64, option: i64) -> ClientResult<()> {
        self.require_course_owner(course, "delete option", AccessGate::can_manage_quiz)
            .await?;

        self.execute(
            Method::DELETE,
            &format!("{}options/{}/", question_path(course, question), option),
            Payload::Empty,
        )
        .await
    }

    async fn require_course_owner(
        &self,
        course: CourseId,
        action: &str,
        check: fn(&AccessGate, Ownership) -> bool,
    ) -> ClientResult<()> {
        let gate = self.gate().await?;
        let course = self.get_course(course).await?;
        ensure_permitted(check(&gate, course.creator_ownership(gate.user())), action, || {
            format!("only the Champion who created course {} may do this", course.id)
        })
    }
}
