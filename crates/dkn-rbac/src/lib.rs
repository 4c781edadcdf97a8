//! # DKN RBAC (Authorization Gate)
//!
//! This crate is the single place where the DKN front end decides what a
//! user may do. Every screen consumes the same capability table instead of
//! branching on the role string locally.
//!
//! ## Overview
//!
//! The dkn-rbac crate handles:
//! - **Roles**: Employee, Champion, Officer, Council
//! - **Subjects**: resources, reviews, projects, workspaces, posts, courses, quizzes
//! - **Actions**: upload, submit, decide, publish, manage, ...
//! - **Permissions**: Subject + Action [+ item id], collected in sets
//! - **Gate**: role table plus ownership-scoped grants
//!
//! ## Architecture
//!
//! ```text
//! Permission = Subject + Action [+ Item ID]
//!
//! Examples:
//!   "resource:publish"            - Publish any resource
//!   "project:manage_members:42"   - Manage members of project 42
//!   "quiz:manage"                 - Manage quizzes (creator-owned courses only)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use dkn_rbac::{AccessGate, Ownership, Role, User};
//!
//! let employee = User::new(1, "dana", Role::Employee);
//! let gate = AccessGate::new(&employee);
//!
//! assert!(gate.can_upload_resource());
//! assert!(!gate.can_publish());
//!
//! // Ownership-scoped: only the uploader may delete their resource.
//! assert!(gate.can_delete_resource(Ownership::of(&employee, Some(1))));
//! assert!(!gate.can_delete_resource(Ownership::of(&employee, Some(2))));
//! ```
//!
//! ## Failure semantics
//!
//! Checks never error; a denied capability is simply `false`. The server is
//! the authority and rejects anything the gate would have hidden.

pub mod actions;
pub mod gate;
pub mod permissions;
pub mod roles;
pub mod subjects;
pub mod user;

// Re-export main types for convenience
pub use actions::Action;
pub use gate::{AccessGate, Capabilities, Ownership, Section};
pub use permissions::{Permission, PermissionSet};
pub use roles::Role;
pub use subjects::{Area, Subject};
pub use user::{User, UserId};
