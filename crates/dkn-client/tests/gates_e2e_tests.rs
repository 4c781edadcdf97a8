//! End-to-end tests for the Authorization Gate in front of the listing,
//! upload, collaboration and training endpoints.
//!
//! A refused call must never reach the server; every refusal mock below
//! expects zero requests.

mod common;

use common::{champion, council, employee, officer, resource, TestFixture};
use dkn_client::{ClientError, ErrorKind};
use dkn_knowledge::collab::{Assignment, AssignmentRole, NewAssignment, Post, UserSummary};
use dkn_knowledge::training::{NewCourse, NewQuestion, QuizSubmission};
use dkn_knowledge::{FileUpload, ResourceStatus, ResourceUpload};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn refuse_any(server: &MockServer, verb: &str) {
    Mock::given(method(verb))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

fn project_body(lead: i64) -> serde_json::Value {
    json!({
        "id": 9,
        "name": "Coastal survey",
        "region": "EU",
        "status": "ACTIVE",
        "lead": {"id": lead, "username": "lee"},
        "created_by": {"id": 7, "username": "cleo"}
    })
}

fn course_body(created_by_name: &str) -> serde_json::Value {
    json!({
        "id": 3,
        "title": "Data hygiene",
        "region": "GLOBAL",
        "created_by_name": created_by_name,
        "materials": []
    })
}

// =============================================================================
// Knowledge listings and upload
// =============================================================================

#[tokio::test]
async fn test_review_queue_refused_for_employee() {
    let fixture = TestFixture::logged_in(employee()).await;
    refuse_any(&fixture.server, "GET").await;

    let err = fixture.client.review_queue().await.unwrap_err();
    assert!(matches!(err, ClientError::NotPermitted { .. }));
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
}

#[tokio::test]
async fn test_review_queue_for_reviewer() {
    let fixture = TestFixture::logged_in(officer()).await;

    Mock::given(method("GET"))
        .and(path("/api/knowledge/review-queue/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "results": [resource(5, "PENDING_REVIEW", Some("REGIONAL_OFFICER"), 4)]
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let queue = fixture.client.review_queue().await.expect("queue");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].status, ResourceStatus::PendingReview);
}

#[tokio::test]
async fn test_unexpected_listing_shape_is_empty() {
    let fixture = TestFixture::logged_in(employee()).await;

    Mock::given(method("GET"))
        .and(path("/api/knowledge/resources/published/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "ok"})))
        .mount(&fixture.server)
        .await;

    let published = fixture.client.published_resources().await.expect("listing");
    assert!(published.is_empty());
}

#[tokio::test]
async fn test_upload_refused_for_council() {
    let fixture = TestFixture::logged_in(council()).await;
    refuse_any(&fixture.server, "POST").await;

    let upload = ResourceUpload::default()
        .title("Guide")
        .file(FileUpload::new("guide.pdf", b"%PDF".to_vec()));

    let err = fixture.client.upload_resource(&upload).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
}

#[tokio::test]
async fn test_employee_uploads_resource() {
    let fixture = TestFixture::logged_in(employee()).await;

    Mock::given(method("POST"))
        .and(path("/api/knowledge/upload/"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("Field safety handbook"))
        .and(body_string_contains("safety, field"))
        .and(body_string_contains(r#"{"owner":"ops"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_json(resource(12, "DRAFT", None, 4)))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let upload = ResourceUpload::default()
        .title("Field safety handbook")
        .tags("safety, field")
        .metadata("owner", "ops")
        .metadata("  ", "ignored")
        .file(FileUpload::new("handbook.pdf", b"%PDF-1.7".to_vec()).with_mime("application/pdf"));

    let created = fixture.client.upload_resource(&upload).await.expect("upload");
    assert_eq!(created.id, 12);
    assert_eq!(created.status, ResourceStatus::Draft);
}

#[tokio::test]
async fn test_upload_without_title_rejected_locally() {
    let fixture = TestFixture::logged_in(employee()).await;
    refuse_any(&fixture.server, "POST").await;

    let upload = ResourceUpload::default().file(FileUpload::new("a.pdf", b"x".to_vec()));
    let err = fixture.client.upload_resource(&upload).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// =============================================================================
// Collaboration
// =============================================================================

/// Test that a project lead adds a member regardless of platform role.
#[tokio::test]
async fn test_lead_adds_member() {
    let fixture = TestFixture::logged_in(officer()).await;

    Mock::given(method("GET"))
        .and(path("/api/collab/projects/9/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_body(6)))
        .mount(&fixture.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/collab/projects/9/assignments/"))
        .and(body_json(json!({"user_id": 4, "role": "REVIEWER"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 30,
            "user": {"id": 4, "username": "dana"},
            "role": "REVIEWER"
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let added = fixture
        .client
        .add_member(9, &NewAssignment::new(4, AssignmentRole::Reviewer))
        .await
        .expect("add member");
    assert_eq!(added.user.id, 4);
    assert_eq!(added.role, AssignmentRole::Reviewer);
}

#[tokio::test]
async fn test_non_lead_cannot_add_member() {
    let fixture = TestFixture::logged_in(champion()).await;

    Mock::given(method("GET"))
        .and(path("/api/collab/projects/9/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_body(6)))
        .mount(&fixture.server)
        .await;
    refuse_any(&fixture.server, "POST").await;

    let err = fixture
        .client
        .add_member(9, &NewAssignment::new(4, AssignmentRole::Member))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotPermitted { ref action, .. } if action == "add member"));
}

#[tokio::test]
async fn test_lead_assignment_cannot_be_removed() {
    let fixture = TestFixture::logged_in(officer()).await;
    refuse_any(&fixture.server, "GET").await;
    refuse_any(&fixture.server, "DELETE").await;

    let lead = Assignment {
        id: 1,
        user: UserSummary {
            id: 6,
            username: "lee".to_string(),
            email: None,
        },
        role: AssignmentRole::Lead,
        assigned_at: None,
    };

    let err = fixture.client.remove_member(9, &lead).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = fixture
        .client
        .add_member(9, &NewAssignment::new(4, AssignmentRole::Lead))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_only_author_deletes_post() {
    let fixture = TestFixture::logged_in(employee()).await;

    Mock::given(method("DELETE"))
        .and(path("/api/collab/spaces/2/posts/40/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let own: Post = serde_json::from_value(json!({
        "id": 40,
        "author": {"id": 4, "username": "dana"},
        "message": "draft notes"
    }))
    .expect("post");
    let other: Post = serde_json::from_value(json!({
        "id": 41,
        "author": {"id": 5, "username": "amira"},
        "message": "hello"
    }))
    .expect("post");

    fixture.client.delete_post(2, &own).await.expect("own post");

    let err = fixture.client.delete_post(2, &other).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
}

#[tokio::test]
async fn test_post_needs_message_or_file() {
    let fixture = TestFixture::logged_in(employee()).await;
    refuse_any(&fixture.server, "POST").await;

    let err = fixture.client.create_post(2, "   ", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// =============================================================================
// Training
// =============================================================================

#[tokio::test]
async fn test_create_course_champion_only() {
    let fixture = TestFixture::logged_in(employee()).await;
    refuse_any(&fixture.server, "POST").await;

    let err = fixture
        .client
        .create_course(&NewCourse::new("Data hygiene", "GLOBAL"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
}

#[tokio::test]
async fn test_employee_submits_quiz() {
    let fixture = TestFixture::logged_in(employee()).await;

    Mock::given(method("POST"))
        .and(path("/api/training/courses/3/quiz/submit/"))
        .and(body_json(json!({"answers": [{"question": 1, "option": 2}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "score": 1,
            "total_questions": 1,
            "percent": 100.0,
            "is_passed": true
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result = fixture
        .client
        .submit_quiz(3, &QuizSubmission::from_pairs([(1, 2)]))
        .await
        .expect("quiz");
    assert!(result.passed);
    assert_eq!(result.score, 1);
}

#[tokio::test]
async fn test_champion_cannot_take_quiz() {
    let fixture = TestFixture::logged_in(champion()).await;
    refuse_any(&fixture.server, "POST").await;

    let err = fixture
        .client
        .submit_quiz(3, &QuizSubmission::from_pairs([(1, 2)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
}

/// Test that the course creator, matched by username, adds a question.
#[tokio::test]
async fn test_course_owner_adds_question() {
    let fixture = TestFixture::logged_in(champion()).await;

    Mock::given(method("GET"))
        .and(path("/api/training/courses/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(course_body("amira")))
        .mount(&fixture.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/training/courses/3/questions/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 8,
            "text": "Where are backups kept?",
            "options": []
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let question = fixture
        .client
        .add_question(3, &NewQuestion::new("Where are backups kept?", Some(1)))
        .await
        .expect("question");
    assert_eq!(question.id, 8);
}

#[tokio::test]
async fn test_other_champion_cannot_manage_quiz() {
    let fixture = TestFixture::logged_in(champion()).await;

    Mock::given(method("GET"))
        .and(path("/api/training/courses/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(course_body("someone-else")))
        .mount(&fixture.server)
        .await;
    refuse_any(&fixture.server, "POST").await;

    let err = fixture
        .client
        .add_question(3, &NewQuestion::new("Where are backups kept?", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotPermitted { .. }));
}
