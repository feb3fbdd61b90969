//! Jira HTTP client wrapper around gouqi
//!
//! gouqi owns base-URL/path joining and the authentication headers; this
//! module adds timeouts, status classification and a JSON-in/JSON-out
//! surface. Tools talk to Jira through the [`JiraApi`] trait so they can be
//! exercised against an in-memory fake.
//!
//! Core API calls go to REST API version 3, the version that carries rich
//! text as ADF documents. `latest` resolves to the version 2 API, which
//! expects and returns plain strings.

use crate::config::JiraConfig;
use crate::error::{JiraMcpError, JiraMcpResult};
use async_trait::async_trait;
use gouqi::r#async::Jira;
use gouqi::{ClientCore, Session};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};

/// REST API version for the platform API; ADF bodies are only accepted here
pub const CORE_API_VERSION: &str = "3";

/// REST API family an endpoint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFamily {
    /// Platform REST API (`/rest/api/3/...`): issues, comments, worklogs, projects
    Core,
    /// Jira Software REST API (`/rest/agile/latest/...`): boards, sprints
    Agile,
}

impl ApiFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiFamily::Core => "api",
            ApiFamily::Agile => "agile",
        }
    }

    /// Version segment of the request path, `None` meaning `latest`
    pub fn version(&self) -> Option<&'static str> {
        match self {
            ApiFamily::Core => Some(CORE_API_VERSION),
            ApiFamily::Agile => None,
        }
    }
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub account_id: String,
    pub display_name: String,
    pub email_address: Option<String>,
    pub active: bool,
}

/// Minimal JSON surface of the Jira REST API used by the tools
#[async_trait]
pub trait JiraApi: Send + Sync {
    /// GET an endpoint and decode the JSON body
    async fn get_json(&self, api: ApiFamily, path: &str) -> JiraMcpResult<Value>;

    /// POST a JSON body to a core API endpoint and decode the JSON response
    async fn post_json(&self, path: &str, body: Value) -> JiraMcpResult<Value>;

    /// PUT a JSON body to a core API endpoint; Jira answers with no content
    async fn put_json(&self, path: &str, body: Value) -> JiraMcpResult<()>;

    /// The authenticated user
    async fn current_user(&self) -> JiraMcpResult<UserInfo>;

    /// Base URL of the Jira instance, without trailing slash
    fn base_url(&self) -> &str;
}

/// gouqi-backed Jira client
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: Arc<Jira>,

    /// URL building and credentials for requests gouqi has no versioned
    /// method for (PUT)
    core: ClientCore,

    http: reqwest::Client,
    config: Arc<JiraConfig>,
}

impl JiraClient {
    /// Create a new Jira client and verify the connection
    #[instrument(skip_all)]
    pub async fn new(config: Arc<JiraConfig>) -> JiraMcpResult<Self> {
        info!("Initializing Jira client for URL: {}", config.jira_url);

        let jira_client = Self::build(config)?;
        jira_client.test_connection().await?;

        info!("Jira client initialized successfully");
        Ok(jira_client)
    }

    /// Create the client without contacting Jira
    fn build(config: Arc<JiraConfig>) -> JiraMcpResult<Self> {
        let credentials = config.to_gouqi_credentials();
        let http = reqwest::Client::new();
        let core = ClientCore::new(config.jira_url.as_str(), credentials.clone())?;
        let client = Jira::from_client(config.jira_url.as_str(), credentials, http.clone())?;

        Ok(Self {
            client: Arc::new(client),
            core,
            http,
            config,
        })
    }

    #[instrument(skip_all)]
    async fn test_connection(&self) -> JiraMcpResult<()> {
        debug!("Testing Jira connection");

        match self.current_user().await {
            Ok(user) => {
                info!(
                    "Connection test successful, authenticated as: {}",
                    user.display_name
                );
                Ok(())
            }
            Err(e) => {
                error!("Connection test failed: {}", e);
                Err(e)
            }
        }
    }

    fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_seconds)
    }

    /// Run a gouqi call under the configured timeout and classify failures
    async fn call<T, F>(&self, method: &str, path: &str, request: F) -> JiraMcpResult<T>
    where
        F: Future<Output = Result<T, gouqi::Error>>,
    {
        timeout(self.timeout_duration(), request)
            .await
            .map_err(|_| JiraMcpError::network(format!("Timeout on {} {}", method, path)))?
            .map_err(|e| classify_error(e, path))
    }

    /// Versioned PUT built from gouqi's URL, body and credential helpers
    async fn put_versioned(&self, path: &str, body: Value) -> Result<(), gouqi::Error> {
        let url = self
            .core
            .build_versioned_url(ApiFamily::Core.as_str(), ApiFamily::Core.version(), path)?;
        let data = self.core.prepare_json_body(body)?;

        let request = self
            .http
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, "application/json")
            .body(data);
        let response = self.core.apply_credentials_async(request).send().await?;

        let status = response.status();
        let text = response.text().await?;
        self.core.process_response::<()>(status, &text)
    }

    fn convert_session_to_user_info(&self, session: &Session) -> UserInfo {
        UserInfo {
            account_id: session.name.clone(),
            display_name: session.name.clone(),
            email_address: None,
            active: true,
        }
    }
}

/// Map a gouqi failure to an error category using the HTTP status
fn classify_error(err: gouqi::Error, path: &str) -> JiraMcpError {
    match err {
        gouqi::Error::NotFound => JiraMcpError::not_found("resource", path),
        gouqi::Error::Unauthorized => JiraMcpError::auth(err.to_string()),
        gouqi::Error::Fault { code, .. } if code == reqwest::StatusCode::FORBIDDEN => {
            JiraMcpError::permission(format!("Access to {} denied", path))
        }
        gouqi::Error::Fault { code, .. } if code == reqwest::StatusCode::NOT_FOUND => {
            JiraMcpError::not_found("resource", path)
        }
        other => JiraMcpError::from(other),
    }
}

#[async_trait]
impl JiraApi for JiraClient {
    #[instrument(skip(self))]
    async fn get_json(&self, api: ApiFamily, path: &str) -> JiraMcpResult<Value> {
        debug!("GET {} {}", api.as_str(), path);
        self.call(
            "GET",
            path,
            self.client
                .get_versioned::<Value>(api.as_str(), api.version(), path),
        )
        .await
    }

    #[instrument(skip(self, body))]
    async fn post_json(&self, path: &str, body: Value) -> JiraMcpResult<Value> {
        debug!("POST {}", path);
        self.call(
            "POST",
            path,
            self.client.post_versioned::<Value, Value>(
                ApiFamily::Core.as_str(),
                ApiFamily::Core.version(),
                path,
                body,
            ),
        )
        .await
    }

    #[instrument(skip(self, body))]
    async fn put_json(&self, path: &str, body: Value) -> JiraMcpResult<()> {
        debug!("PUT {}", path);
        self.call("PUT", path, self.put_versioned(path, body)).await
    }

    #[instrument(skip_all)]
    async fn current_user(&self) -> JiraMcpResult<UserInfo> {
        debug!("Fetching current user information");
        let session = self.call("GET", "/session", self.client.session()).await?;
        Ok(self.convert_session_to_user_info(&session))
    }

    fn base_url(&self) -> &str {
        &self.config.jira_url
    }
}
