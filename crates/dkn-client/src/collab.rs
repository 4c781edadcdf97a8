//! Collaboration endpoints: projects, members, workspaces and posts.
//!
//! Every mutation is checked against the Authorization Gate before it is
//! sent. Ownership-scoped checks (project lead, project creator, post
//! author) fetch the project first so the check sees current server state.

use reqwest::Method;
use tracing::{debug, instrument};

use dkn_knowledge::collab::{
    Assignment, NewAssignment, NewProject, NewWorkspace, Post, Project, ProjectId, UserSummary,
    Workspace, WorkspaceId,
};
use dkn_knowledge::{FileUpload, ValidationError};
use dkn_rbac::{AccessGate, Ownership};

use crate::client::{ensure_permitted, FormData, KnowledgeClient, Payload};
use crate::error::ClientResult;

fn project_path(id: ProjectId) -> String {
    format!("/collab/projects/{}/", id)
}

impl KnowledgeClient {
    /// Projects visible to the session user.
    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        self.get_list("/collab/projects/").await
    }

    /// Fetch one project.
    pub async fn get_project(&self, id: ProjectId) -> ClientResult<Project> {
        self.get(&project_path(id)).await
    }

    /// Create a project.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotPermitted`](crate::ClientError::NotPermitted)
    /// unless the role may create projects.
    #[instrument(skip(self, project), fields(name = %project.name))]
    pub async fn create_project(&self, project: &NewProject) -> ClientResult<Project> {
        let gate = self.gate().await?;
        ensure_permitted(gate.can_create_project(), "create project", || {
            format!("role {} cannot create projects", gate.role())
        })?;
        project.validate()?;

        self.mutate(Method::POST, "/collab/projects/", Payload::json(project)?)
            .await
    }

    /// Delete a project. Allowed to its lead or its creator.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, id: ProjectId) -> ClientResult<()> {
        let (gate, project) = self.project_gate(id).await?;
        ensure_permitted(
            gate.can_delete_project(project.delete_ownership(gate.user())),
            "delete project",
            || format!("only the lead or creator ({}) may delete the project", project.owner_label()),
        )?;

        self.execute(Method::DELETE, &project_path(id), Payload::Empty)
            .await
    }

    /// Members of a project.
    pub async fn list_assignments(&self, project: ProjectId) -> ClientResult<Vec<Assignment>> {
        self.get_list(&format!("/collab/projects/{}/assignments/", project))
            .await
    }

    /// Users who can still be added to a project.
    pub async fn available_users(&self, project: ProjectId) -> ClientResult<Vec<UserSummary>> {
        self.get_list(&format!("/collab/projects/{}/available-users/", project))
            .await
    }

    /// Add a member. Lead only; the LEAD role cannot be handed out.
    #[instrument(skip(self))]
    pub async fn add_member(&self, project: ProjectId, assignment: &NewAssignment) -> ClientResult<Assignment> {
        assignment.validate()?;
        self.require_lead(project, "add member", AccessGate::can_manage_project_members)
            .await?;

        self.mutate(
            Method::POST,
            &format!("/collab/projects/{}/assignments/", project),
            Payload::json(assignment)?,
        )
        .await
    }

    /// Remove a member. Lead only; the lead's own assignment stays.
    #[instrument(skip(self, assignment), fields(user_id = assignment.user.id))]
    pub async fn remove_member(&self, project: ProjectId, assignment: &Assignment) -> ClientResult<()> {
        if !assignment.is_removable() {
            return Err(ValidationError::LeadAssignment.into());
        }
        self.require_lead(project, "remove member", AccessGate::can_manage_project_members)
            .await?;

        self.execute(
            Method::DELETE,
            &format!("/collab/projects/{}/assignments/{}/", project, assignment.user.id),
            Payload::Empty,
        )
        .await
    }

    /// Workspaces of a project.
    pub async fn list_workspaces(&self, project: ProjectId) -> ClientResult<Vec<Workspace>> {
        self.get_list(&format!("/collab/projects/{}/spaces/", project))
            .await
    }

    /// Fetch one workspace.
    pub async fn get_workspace(&self, id: WorkspaceId) -> ClientResult<Workspace> {
        self.get(&format!("/collab/spaces/{}/", id)).await
    }

    /// Create a workspace. Lead only.
    #[instrument(skip(self, workspace), fields(title = %workspace.title))]
    pub async fn create_workspace(&self, project: ProjectId, workspace: &NewWorkspace) -> ClientResult<Workspace> {
        workspace.validate()?;
        self.require_lead(project, "create workspace", AccessGate::can_manage_workspaces)
            .await?;

        self.mutate(
            Method::POST,
            &format!("/collab/projects/{}/spaces/", project),
            Payload::json(workspace)?,
        )
        .await
    }

    /// Delete a workspace of `project`. Lead only.
    #[instrument(skip(self))]
    pub async fn delete_workspace(&self, project: ProjectId, workspace: WorkspaceId) -> ClientResult<()> {
        self.require_lead(project, "delete workspace", AccessGate::can_manage_workspaces)
            .await?;

        self.execute(Method::DELETE, &format!("/collab/spaces/{}/", workspace), Payload::Empty)
            .await
    }

    /// Posts in a workspace.
    pub async fn list_posts(&self, workspace: WorkspaceId) -> ClientResult<Vec<Post>> {
        self.get_list(&format!("/collab/spaces/{}/posts/", workspace))
            .await
    }

    /// Post a message, optionally with a file.
    ///
    /// A post needs a non-blank message or a file. Membership of the
    /// workspace is checked by the server.
    #[instrument(skip(self, message, file))]
    pub async fn create_post(
        &self,
        workspace: WorkspaceId,
        message: &str,
        file: Option<FileUpload>,
    ) -> ClientResult<Post> {
        if message.trim().is_empty() && file.is_none() {
            return Err(ValidationError::MissingField("message").into());
        }

        let mut form = FormData::new().text("message", message.trim());
        if let Some(file) = file {
            form = form.file("file", file);
        }

        self.mutate(
            Method::POST,
            &format!("/collab/spaces/{}/posts/", workspace),
            Payload::Form(form),
        )
        .await
    }

    /// Delete a post. Author only.
    #[instrument(skip(self, post), fields(post_id = post.id))]
    pub async fn delete_post(&self, workspace: WorkspaceId, post: &Post) -> ClientResult<()> {
        let gate = self.gate().await?;
        ensure_permitted(
            gate.can_delete_post(post.author_ownership(gate.user())),
            "delete post",
            || "only the author may delete a post".to_string(),
        )?;

        self.execute(
            Method::DELETE,
            &format!("/collab/spaces/{}/posts/{}/", workspace, post.id),
            Payload::Empty,
        )
        .await
    }

    async fn project_gate(&self, id: ProjectId) -> ClientResult<(AccessGate, Project)> {
        let gate = self.gate().await?;
        let project = self.get_project(id).await?;
        Ok((gate, project))
    }

    async fn require_lead(
        &self,
        project: ProjectId,
        action: &str,
        check: fn(&AccessGate, Ownership) -> bool,
    ) -> ClientResult<()> {
        let (gate, project) = self.project_gate(project).await?;
        debug!(project_id = project.id, "Checking project lead");
        ensure_permitted(
            check(&gate, project.lead_ownership(gate.user())),
            action,
            || format!("only the lead of project {} may do this", project.id),
        )
    }
}
