//! Authenticated HTTP transport for the DKN API.
//!
//! [`KnowledgeClient`] owns the reqwest client, the configuration and the
//! explicitly passed [`Session`]. Every request goes through [`send`]:
//!
//! 1. attach `Authorization: Bearer <access>` (refreshing first when the
//!    access token has already expired)
//! 2. on `401`, refresh once and replay the request once
//! 3. a second `401` is [`ClientError::Unauthorized`]
//!
//! A refresh that cannot complete clears the session. Reads are retried on
//! transient failures; mutations are sent exactly once.
//!
//! [`send`]: KnowledgeClient::send

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use dkn_auth::{access_expired, AuthError, Session, TokenPair};
use dkn_knowledge::{FileUpload, ResourceUpload, UploadKind};
use dkn_rbac::{AccessGate, User};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::retry::{with_retry_if, RetryConfig};

const LOGIN_PATH: &str = "/auth/login/";
const REFRESH_PATH: &str = "/auth/refresh/";
const PROFILE_PATH: &str = "/accounts/profile/";

/// Access tokens expiring within this many seconds are refreshed up front.
const EXPIRY_LEEWAY_SECS: i64 = 30;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access: Option<String>,
}

/// Request body, kept in a form that can be rebuilt for a replay.
#[derive(Debug, Clone)]
pub(crate) enum Payload {
    Empty,
    Json(Value),
    Form(FormData),
}

impl Payload {
    pub(crate) fn json<B: Serialize + ?Sized>(body: &B) -> ClientResult<Self> {
        serde_json::to_value(body)
            .map(Payload::Json)
            .map_err(|e| ClientError::Validation(e.to_string()))
    }
}

/// Multipart fields. A reqwest `Form` is consumed when sent, so the form is
/// built again for every attempt.
#[derive(Debug, Clone, Default)]
pub(crate) struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<(String, FileUpload)>,
}

impl FormData {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub(crate) fn file(mut self, name: impl Into<String>, file: FileUpload) -> Self {
        self.files.push((name.into(), file));
        self
    }

    /// Fields of a resource or version upload, with the file under `file`.
    pub(crate) fn from_upload(upload: &ResourceUpload, kind: UploadKind) -> Self {
        let mut form = Self::new();
        for (name, value) in upload.text_fields(kind) {
            form = form.text(name, value);
        }
        if let Some(file) = &upload.file {
            form = form.file("file", file.clone());
        }
        form
    }

    fn build(&self) -> ClientResult<Form> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for (name, file) in &self.files {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(mime) = &file.mime_type {
                part = part.mime_str(mime)?;
            }
            form = form.part(name.clone(), part);
        }
        Ok(form)
    }
}

/// Client for the DKN REST API.
///
/// Cloning is cheap; clones share the HTTP connection pool and the session.
///
/// # Example
///
/// ```rust,no_run
/// use dkn_client::{ClientConfig, KnowledgeClient};
///
/// # async fn run() -> dkn_client::ClientResult<()> {
/// let client = KnowledgeClient::connect(ClientConfig::from_env()).await?;
/// let user = client.login("dana", "secret").await?;
/// println!("logged in as {} ({})", user.username, user.role);
///
/// for resource in client.my_resources().await? {
///     println!("{} {}", resource.id, resource.status);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KnowledgeClient {
    /// HTTP client instance.
    http: Client,

    /// Endpoint and timeout settings.
    config: ClientConfig,

    /// Tokens and current user.
    session: Session,

    /// Retry policy for reads.
    read_retry: RetryConfig,
}

impl std::fmt::Debug for KnowledgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl KnowledgeClient {
    /// Create a client around an existing session.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for an invalid configuration, or
    /// [`ClientError::Request`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, session: Session) -> ClientResult<Self> {
        config
            .validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http,
            read_retry: config.read_retry(),
            config,
            session,
        })
    }

    /// Create a client, restoring the session from the configured store.
    pub async fn connect(config: ClientConfig) -> ClientResult<Self> {
        let session = Session::load(config.session_store()).await?;
        Self::new(config, session)
    }

    /// The session this client reads and updates.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Log in and load the user's profile.
    ///
    /// Stores the token pair, then fetches `/accounts/profile/` and records
    /// the user on the session.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] when the server refuses the login
    /// - [`ClientError::InvalidResponse`] when either token is missing
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        debug!("Logging in");

        let response = self
            .http
            .post(self.config.url(LOGIN_PATH))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            error!(status = status.as_u16(), "Login refused");
            return Err(AuthError::InvalidCredentials.into());
        }

        let body: LoginResponse = self.handle_response(response).await?;
        let (access, refresh) = match (body.access, body.refresh) {
            (Some(access), Some(refresh)) => (access, refresh),
            _ => {
                return Err(ClientError::InvalidResponse(
                    "login response is missing a token".to_string(),
                ))
            }
        };

        self.session.establish(TokenPair::new(access, refresh)).await?;

        let user = match self.profile().await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "Failed to load profile after login");
                self.session.clear().await?;
                return Err(e);
            }
        };
        self.session.set_user(user.clone()).await?;

        info!(user_id = user.id, role = %user.role, "Logged in");
        Ok(user)
    }

    /// Forget tokens and user.
    pub async fn logout(&self) -> ClientResult<()> {
        self.session.clear().await?;
        Ok(())
    }

    /// Fetch the logged-in user's profile.
    pub async fn profile(&self) -> ClientResult<User> {
        self.get(PROFILE_PATH).await
    }

    /// The session user, or [`AuthError::NotAuthenticated`].
    pub async fn current_user(&self) -> ClientResult<User> {
        self.session
            .user()
            .await
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }

    /// Authorization Gate for the session user.
    pub async fn gate(&self) -> ClientResult<AccessGate> {
        Ok(AccessGate::new(&self.current_user().await?))
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// On any failure the session is cleared and the user has to log in
    /// again.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ClientResult<String> {
        match self.request_refresh().await {
            Ok(access) => {
                self.session.update_access_token(access.clone()).await?;
                info!("Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                error!(error = %e, "Token refresh failed, clearing session");
                self.session.clear().await?;
                Err(e)
            }
        }
    }

    async fn request_refresh(&self) -> ClientResult<String> {
        let refresh = self
            .session
            .refresh_token()
            .await
            .ok_or(AuthError::NoRefreshToken)?;

        let response = self
            .http
            .post(self.config.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshRejected(format!("{}: {}", status.as_u16(), message)).into());
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        body.access
            .filter(|access| !access.is_empty())
            .ok_or_else(|| {
                AuthError::RefreshRejected("response carried no access token".to_string()).into()
            })
    }

    /// Access token to send, refreshed first if it has already expired.
    async fn bearer(&self) -> ClientResult<Option<String>> {
        match self.session.access_token().await {
            Some(token) if access_expired(&token, chrono::Duration::seconds(EXPIRY_LEEWAY_SECS)) => {
                debug!("Access token expired, refreshing before request");
                self.refresh().await.map(Some)
            }
            token => Ok(token),
        }
    }

    /// Send an authorized request, refreshing and replaying once on 401.
    #[instrument(skip(self, payload))]
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        payload: &Payload,
    ) -> ClientResult<Response> {
        let access = self.bearer().await?;
        let response = self.dispatch(&method, path, payload, access.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Access token rejected, refreshing and replaying");
        let access = self.refresh().await?;
        let response = self.dispatch(&method, path, payload, Some(&access)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            error!("Request still unauthorized after token refresh");
            return Err(ClientError::Unauthorized);
        }
        Ok(response)
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        payload: &Payload,
        access: Option<&str>,
    ) -> ClientResult<Response> {
        let mut request = self.http.request(method.clone(), self.config.url(path));

        if let Some(token) = access {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(body),
            Payload::Form(form) => request.multipart(form.build()?),
        };

        Ok(request.send().await?)
    }

    /// Idempotent GET, retried on transient failures.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        with_retry_if(
            &self.read_retry,
            path,
            || async {
                let response = self.send(Method::GET, path, &Payload::Empty).await?;
                self.handle_response(response).await
            },
            ClientError::is_transient,
        )
        .await
    }

    /// GET a listing. Anything other than an array (or a paginated object
    /// with `results`) is an empty list.
    pub(crate) async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        let value: Value = self.get(path).await?;
        list_from_value(path, value)
    }

    /// Mutation whose response body is returned.
    pub(crate) async fn mutate<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> ClientResult<T> {
        let response = self.send(method, path, &payload).await?;
        self.handle_response(response).await
    }

    /// Mutation whose response body is ignored.
    pub(crate) async fn execute(&self, method: Method, path: &str, payload: Payload) -> ClientResult<()> {
        let response = self.send(method, path, &payload).await?;
        self.check_status(response).await?;
        Ok(())
    }

    /// Handle API response, checking for errors.
    pub(crate) async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let response = self.check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn check_status(&self, response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!("DKN API error ({}): {}", status.as_u16(), message);

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            _ => ClientError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

/// Turn a gate verdict into a result, logging refusals.
pub(crate) fn ensure_permitted(
    allowed: bool,
    action: &str,
    reason: impl FnOnce() -> String,
) -> ClientResult<()> {
    if allowed {
        return Ok(());
    }
    let reason = reason();
    warn!(action, reason = %reason, "Action refused by gate");
    Err(ClientError::not_permitted(action, reason))
}

fn list_from_value<T: DeserializeOwned>(path: &str, value: Value) -> ClientResult<Vec<T>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                debug!(path, "Listing response is not a list, treating as empty");
                return Ok(Vec::new());
            }
        },
        _ => {
            debug!(path, "Listing response is not a list, treating as empty");
            return Ok(Vec::new());
        }
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| ClientError::InvalidResponse(e.to_string())))
        .collect()
}
