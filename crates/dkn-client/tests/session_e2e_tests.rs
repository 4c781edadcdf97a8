//! End-to-end tests for login, token refresh and session persistence.
//!
//! Flows:
//! 1. Login: tokens stored, profile loaded
//! 2. 401 → refresh → replay once
//! 3. Refresh failure → session cleared
//! 4. Proactive refresh of an expired JWT
//! 5. Session restored from and removed from a file

mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{config, employee, TestFixture};
use dkn_auth::{AuthError, FileSessionStore, Session, TokenPair};
use dkn_client::{ClientConfig, ClientError, ErrorKind, KnowledgeClient};
use dkn_rbac::Role;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MINE_PATH: &str = "/api/knowledge/resources/mine/";

async fn mount_profile(server: &MockServer, access: &str) {
    Mock::given(method("GET"))
        .and(path("/api/accounts/profile/"))
        .and(header("Authorization", format!("Bearer {}", access).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "username": "dana",
            "email": "dana@example.org",
            "role": "EMPLOYEE",
            "region": "EU"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn session_config(server: &MockServer, file: &std::path::Path) -> ClientConfig {
    ClientConfig {
        session_file: Some(file.to_path_buf()),
        ..config(server)
    }
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_establishes_session() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"username": "dana", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "access-1", "refresh": "refresh-1"})),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;
    mount_profile(&fixture.server, "access-1").await;

    let user = fixture.client.login("dana", "secret").await.expect("login should succeed");
    assert_eq!(user.role, Role::Employee);
    assert_eq!(user.region.as_deref(), Some("EU"));

    let session = fixture.client.session();
    assert!(session.is_authenticated().await);
    assert_eq!(session.tokens().await, Some(TokenPair::new("access-1", "refresh-1")));
    assert_eq!(session.user().await, Some(user));
}

#[tokio::test]
async fn test_login_refused() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "No active account found with the given credentials"})),
        )
        .mount(&fixture.server)
        .await;

    let err = fixture.client.login("dana", "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(AuthError::InvalidCredentials)));
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
    assert!(!fixture.client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_login_without_refresh_token() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-1"})))
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/accounts/profile/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fixture.server)
        .await;

    let err = fixture.client.login("dana", "secret").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
    assert!(!fixture.client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let fixture = TestFixture::logged_in(employee()).await;
    assert!(fixture.client.session().is_authenticated().await);

    fixture.client.logout().await.expect("logout");

    let session = fixture.client.session();
    assert!(!session.is_authenticated().await);
    assert!(session.user().await.is_none());
    assert!(matches!(
        fixture.client.current_user().await,
        Err(ClientError::Auth(AuthError::NotAuthenticated))
    ));
}

// =============================================================================
// Refresh
// =============================================================================

/// Test that a 401 triggers exactly one refresh and one replay with the new
/// token; the refresh token is kept.
#[tokio::test]
async fn test_unauthorized_refreshes_and_replays() {
    let fixture = TestFixture::logged_in(employee()).await;

    Mock::given(method("GET"))
        .and(path(MINE_PATH))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&fixture.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_json(json!({"refresh": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
        .expect(1)
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path(MINE_PATH))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let resources = fixture.client.my_resources().await.expect("replayed request");
    assert!(resources.is_empty());

    let session = fixture.client.session();
    assert_eq!(session.access_token().await.as_deref(), Some("access-2"));
    assert_eq!(session.refresh_token().await.as_deref(), Some("refresh-1"));
    assert_eq!(session.user().await, Some(employee()));
}

#[tokio::test]
async fn test_refresh_failure_clears_session() {
    let fixture = TestFixture::logged_in(employee()).await;

    Mock::given(method("GET"))
        .and(path(MINE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&fixture.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is blacklisted"})),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    let err = fixture.client.my_resources().await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(AuthError::RefreshRejected(_))));
    assert!(err.requires_login());
    assert!(!fixture.client.session().is_authenticated().await);
    assert!(fixture.client.session().user().await.is_none());
}

/// Test that a request still refused after a successful refresh is not
/// replayed again.
#[tokio::test]
async fn test_second_unauthorized_is_final() {
    let fixture = TestFixture::logged_in(employee()).await;

    Mock::given(method("GET"))
        .and(path(MINE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&fixture.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let err = fixture.client.my_resources().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
}

/// Test that an access token whose `exp` has passed is refreshed before
/// the request goes out.
#[tokio::test]
async fn test_expired_jwt_refreshed_before_request() {
    let fixture = TestFixture::new().await;

    let expired = encode(
        &Header::default(),
        &json!({"exp": Utc::now().timestamp() - 60, "token_type": "access"}),
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("encode");

    let session = fixture.client.session();
    session
        .establish(TokenPair::new(expired.clone(), "refresh-1"))
        .await
        .expect("establish");
    session.set_user(employee()).await.expect("set user");

    Mock::given(method("GET"))
        .and(path(MINE_PATH))
        .and(header("Authorization", format!("Bearer {}", expired).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&fixture.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
        .expect(1)
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path(MINE_PATH))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&fixture.server)
        .await;

    fixture.client.my_resources().await.expect("request after refresh");
    assert_eq!(session.access_token().await.as_deref(), Some("access-2"));
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_connect_restores_file_session() {
    common::init_tracing();
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("session.json");

    let saved = Session::load(Arc::new(FileSessionStore::new(&file)))
        .await
        .expect("load");
    saved
        .establish(TokenPair::new("access-1", "refresh-1"))
        .await
        .expect("establish");
    saved.set_user(employee()).await.expect("set user");

    Mock::given(method("GET"))
        .and(path(MINE_PATH))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = KnowledgeClient::connect(session_config(&server, &file))
        .await
        .expect("connect");

    assert_eq!(client.current_user().await.expect("user"), employee());
    client.my_resources().await.expect("authorized request");
}

/// Test a stored session holding only an access token: the first 401 has
/// nothing to refresh with, so the session and its file are removed.
#[tokio::test]
async fn test_missing_refresh_token_clears_stored_session() {
    common::init_tracing();
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("session.json");
    std::fs::write(&file, r#"{"access": "stale"}"#).expect("write session file");

    Mock::given(method("GET"))
        .and(path(MINE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = KnowledgeClient::connect(session_config(&server, &file))
        .await
        .expect("connect");
    assert!(client.session().is_authenticated().await);

    let err = client.my_resources().await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(AuthError::NoRefreshToken)));
    assert!(!client.session().is_authenticated().await);
    assert!(!file.exists());
}
