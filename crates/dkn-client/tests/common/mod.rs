//! Shared fixture for the end-to-end tests.

#![allow(dead_code)]

use dkn_auth::{Session, TokenPair};
use dkn_client::{ClientConfig, KnowledgeClient, ResourceWorkflow};
use dkn_rbac::{Role, User};
use serde_json::{json, Value};
use wiremock::MockServer;

/// Mock DKN API plus a client pointed at it.
pub struct TestFixture {
    /// Mock API server (paths are served under `/api`).
    pub server: MockServer,
    /// Client configured for the mock server.
    pub client: KnowledgeClient,
}

impl TestFixture {
    /// Create a new fixture with an empty in-memory session.
    pub async fn new() -> Self {
        Self::with_timeout(5).await
    }

    /// Create a fixture whose client gives up after `timeout_secs`.
    pub async fn with_timeout(timeout_secs: u64) -> Self {
        init_tracing();

        let server = MockServer::start().await;
        let config = ClientConfig {
            timeout_secs,
            ..config(&server)
        };
        let client = KnowledgeClient::new(config, Session::in_memory()).expect("client");

        Self { server, client }
    }

    /// Create a fixture already logged in as `user` with tokens
    /// `access-1` / `refresh-1`.
    pub async fn logged_in(user: User) -> Self {
        Self::new().await.log_in(user).await
    }

    /// Log the fixture's session in as `user` with tokens
    /// `access-1` / `refresh-1`.
    pub async fn log_in(self, user: User) -> Self {
        let session = self.client.session();
        session
            .establish(TokenPair::new("access-1", "refresh-1"))
            .await
            .expect("establish");
        session.set_user(user).await.expect("set user");
        self
    }

    /// Workflow over the fixture's client.
    pub fn workflow(&self) -> ResourceWorkflow {
        ResourceWorkflow::new(self.client.clone())
    }
}

/// Client settings for `server`, with a short timeout and no session file.
pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        base_url: format!("{}/api", server.uri()),
        timeout_secs: 5,
        read_retries: 2,
        verify_tls: false,
        session_file: None,
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn employee() -> User {
    User::new(4, "dana", Role::Employee)
}

pub fn champion() -> User {
    User::new(5, "amira", Role::Champion)
}

pub fn officer() -> User {
    User::new(6, "lee", Role::Officer)
}

pub fn council() -> User {
    User::new(7, "cleo", Role::Council)
}

/// Resource body as the API returns it.
pub fn resource(id: i64, status: &str, stage: Option<&str>, uploaded_by: i64) -> Value {
    json!({
        "id": id,
        "title": "Field safety handbook",
        "description": "Procedures for site visits",
        "region": "EU",
        "status": status,
        "current_stage": stage,
        "uploaded_by": {"id": uploaded_by, "username": "dana"},
        "tags": "safety, field",
        "versions": [
            {"id": 1, "version_number": 1, "file": "/media/v1.pdf", "created_at": "2026-01-10T09:00:00Z"}
        ],
        "review_steps": [],
        "ai_flags": [
            {"id": 3, "flag_type": "PII", "severity": "HIGH", "message": "Phone number found"}
        ],
        "created_at": "2026-01-10T09:00:00Z"
    })
}

/// Resource body with the given review steps.
pub fn resource_with_steps(id: i64, status: &str, stage: Option<&str>, steps: Value) -> Value {
    let mut body = resource(id, status, stage, 4);
    body["review_steps"] = steps;
    body
}
