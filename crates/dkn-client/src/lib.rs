//! # DKN Client
//!
//! Authenticated REST client for the DKN API and the gated workflow that
//! drives every resource mutation.
//!
//! ## Overview
//!
//! The dkn-client crate handles:
//! - **Transport**: bearer auth, refresh-and-replay on 401, request timeout
//! - **Knowledge**: resource detail and listings, review queue, uploads
//! - **Workflow**: gate, dispatch once, refetch ([`ResourceWorkflow`])
//! - **Collaboration**: projects, members, workspaces, posts
//! - **Training**: courses, materials, quizzes, leaderboards
//! - **Errors**: one [`ClientError`] classified by [`ErrorKind`]
//!
//! ## Endpoints
//!
//! ### Auth
//! - `POST /auth/login/`, `POST /auth/refresh/`, `GET /accounts/profile/`
//!
//! ### Knowledge
//! - `GET /knowledge/resources/{id}/`
//! - `POST /knowledge/resources/{id}/submit/`, `.../decision/`,
//!   `.../publish/`, `.../unpublish/`, `.../versions/`
//! - `DELETE /knowledge/resources/{id}/`
//! - `POST /knowledge/upload/`
//! - `GET /knowledge/resources/mine/`, `/knowledge/resources/published/`,
//!   `/knowledge/review-queue/`, `/knowledge/review-actions/mine/`
//!
//! ### Collaboration and training
//! - `/collab/projects/...`, `/collab/spaces/...`
//! - `/training/courses/...`, `/training/materials/...`,
//!   `/training/my-attempts/`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dkn_client::{ClientConfig, ErrorKind, KnowledgeClient, ResourceWorkflow};
//! use dkn_knowledge::ResourceAction;
//!
//! # async fn run() -> dkn_client::ClientResult<()> {
//! let client = KnowledgeClient::connect(ClientConfig::from_env()).await?;
//! client.login("dana", "secret").await?;
//!
//! let workflow = ResourceWorkflow::new(client);
//! let (resource, actions) = workflow.load(17).await?;
//!
//! if actions.allows(ResourceAction::Submit) {
//!     match workflow.submit(resource.id).await {
//!         Ok(outcome) => println!("{}", outcome.message()),
//!         Err(e) if e.kind() == ErrorKind::Transient => eprintln!("try again later"),
//!         Err(e) => eprintln!("{}", workflow.failure_message(ResourceAction::Submit, &e)),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collab;
pub mod config;
pub mod error;
pub mod resources;
pub mod retry;
pub mod training;
pub mod workflow;

// Re-export main types
pub use client::KnowledgeClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use retry::RetryConfig;
pub use workflow::{ActionOutcome, ResourceWorkflow};
