//! Jira Tools MCP Server Library
//!
//! An MCP server exposing Jira issues, comments, worklogs, projects, boards
//! and sprints to AI agents. Jira Cloud stores rich text in the Atlassian
//! Document Format (ADF); the [`adf`] module converts it to markdown and
//! plain text for reading, and builds documents from plain text for writing.
//!
//! ## Features
//!
//! - **ADF conversion**: total, pure conversions between ADF and text
//! - **Issue tools**: read, search (JQL), create, update descriptions
//! - **Collaboration**: comments and worklogs with rich-text bodies
//! - **Agile metadata**: projects, boards and sprints with TTL caching
//! - **Error Handling**: MCP-compliant error codes and messages

use crate::cache::{MetadataCache, UserMapping};
use crate::config::JiraConfig;
use crate::error::JiraMcpResult;
use crate::jira_client::{JiraApi, JiraClient};
use crate::tools::*;

use pulseengine_mcp_macros::{mcp_server, mcp_tools};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

pub mod adf;
pub mod cache;
pub mod config;
pub mod error;
pub mod formatters;
pub mod jira_client;
pub mod tools;
pub mod validation;

/// Number of tools exposed by the server
const TOOLS_COUNT: usize = 14;

/// Server status information
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JiraServerStatus {
    pub server_name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub jira_url: String,
    pub jira_connection_status: String,
    pub authenticated_user: Option<String>,
    pub cache_stats: cache::CacheStats,
    pub tools_count: usize,
}

impl std::fmt::Display for JiraServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{{\"error\": \"Failed to serialize JiraServerStatus\"}}"),
        }
    }
}

/// Jira Tools MCP Server
///
/// Uses the #[mcp_server] macro for automatic MCP infrastructure generation.
#[mcp_server(
    name = "Jira Tools MCP Server",
    version = "0.1.0",
    description = "Jira issues, comments, worklogs and agile metadata with ADF rich-text conversion",
    auth = "disabled"
)]
#[derive(Clone)]
pub struct JiraToolsServer {
    /// Server start time for uptime calculation
    start_time: Instant,

    /// Jira API used by every tool
    jira: Arc<dyn JiraApi>,

    config: Arc<JiraConfig>,

    cache: Arc<MetadataCache>,

    /// Tool implementations
    get_issue_tool: Arc<GetIssueTool>,
    search_issues_tool: Arc<SearchIssuesTool>,
    create_issue_tool: Arc<CreateIssueTool>,
    update_description_tool: Arc<UpdateIssueDescriptionTool>,
    add_comment_tool: Arc<AddCommentTool>,
    get_comments_tool: Arc<GetCommentsTool>,
    add_worklog_tool: Arc<AddWorklogTool>,
    get_worklogs_tool: Arc<GetWorklogsTool>,
    list_projects_tool: Arc<ListProjectsTool>,
    list_boards_tool: Arc<ListBoardsTool>,
    list_sprints_tool: Arc<ListSprintsTool>,
}

impl Default for JiraToolsServer {
    fn default() -> Self {
        // The macro requires Default; construct through `new()` or `with_config()`
        panic!("JiraToolsServer cannot be created with default(). Use JiraToolsServer::new() instead.")
    }
}

impl JiraToolsServer {
    /// Create a server from environment/file configuration
    #[instrument]
    pub async fn new() -> JiraMcpResult<Self> {
        info!("Initializing Jira Tools MCP Server");

        let config = JiraConfig::load()?;
        info!("Configuration loaded successfully");

        Self::with_config(config).await
    }

    /// Create a server with an explicit configuration, connecting to Jira
    #[instrument(skip(config))]
    pub async fn with_config(config: JiraConfig) -> JiraMcpResult<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let jira_client = JiraClient::new(Arc::clone(&config)).await?;
        info!("Jira client initialized");

        let server = Self::with_api(Arc::new(jira_client), config);
        let _cleanup_handle = Arc::clone(&server.cache).start_cleanup_task();

        if let Err(e) = server.refresh_current_user_cache().await {
            warn!("Could not retrieve current user information: {}", e);
        }

        info!("Jira Tools MCP Server initialized successfully");
        Ok(server)
    }

    /// Assemble the server around an existing Jira API implementation
    pub fn with_api(jira: Arc<dyn JiraApi>, config: Arc<JiraConfig>) -> Self {
        let cache = Arc::new(MetadataCache::new(config.cache_ttl_seconds));

        Self {
            start_time: Instant::now(),
            get_issue_tool: Arc::new(GetIssueTool::new(Arc::clone(&jira))),
            search_issues_tool: Arc::new(SearchIssuesTool::new(
                Arc::clone(&jira),
                config.max_search_results,
            )),
            create_issue_tool: Arc::new(CreateIssueTool::new(Arc::clone(&jira))),
            update_description_tool: Arc::new(UpdateIssueDescriptionTool::new(Arc::clone(&jira))),
            add_comment_tool: Arc::new(AddCommentTool::new(Arc::clone(&jira))),
            get_comments_tool: Arc::new(GetCommentsTool::new(Arc::clone(&jira))),
            add_worklog_tool: Arc::new(AddWorklogTool::new(Arc::clone(&jira))),
            get_worklogs_tool: Arc::new(GetWorklogsTool::new(Arc::clone(&jira))),
            list_projects_tool: Arc::new(ListProjectsTool::new(
                Arc::clone(&jira),
                Arc::clone(&cache),
            )),
            list_boards_tool: Arc::new(ListBoardsTool::new(Arc::clone(&jira), Arc::clone(&cache))),
            list_sprints_tool: Arc::new(ListSprintsTool::new(Arc::clone(&jira))),
            jira,
            config,
            cache,
        }
    }

    fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Fetch the authenticated user and remember it for status reports
    async fn refresh_current_user_cache(&self) -> JiraMcpResult<UserMapping> {
        let user = self.jira.current_user().await?;
        let mapping = UserMapping {
            account_id: user.account_id,
            display_name: user.display_name,
            email_address: user.email_address,
        };
        self.cache.set_current_user(mapping.clone())?;
        Ok(mapping)
    }
}

/// Map a tool failure to the MCP boundary, logging it once
///
/// `#[mcp_tools]` reports every tool error as an internal error carrying only
/// its message, so the MCP error code and data travel in that message.
fn tool_error(tool: &str, e: error::JiraMcpError) -> anyhow::Error {
    let code = e.error_code();
    let data = e.error_data();
    error!(code, %data, "{} failed ({}): {}", tool, e.category(), e);
    anyhow::anyhow!("{} (code {}, data {})", e, code, data)
}

/// All public methods in this impl block become MCP tools automatically
#[mcp_tools]
impl JiraToolsServer {
    /// Get a Jira issue with its description rendered to markdown
    ///
    /// # Examples
    /// - Basic: `{"issue_key": "PROJ-123"}`
    /// - With comments: `{"issue_key": "PROJ-123", "include_comments": true}`
    #[instrument(skip(self))]
    pub async fn get_issue(&self, params: GetIssueParams) -> anyhow::Result<GetIssueResult> {
        self.get_issue_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("get_issue", e))
    }

    /// Search issues with a JQL query
    ///
    /// Each hit carries a short plain-text snippet of its description.
    ///
    /// # Examples
    /// - `{"jql": "project = PROJ AND status = 'In Progress'"}`
    /// - `{"jql": "assignee = currentUser() ORDER BY updated DESC", "limit": 10}`
    /// - Next page: `{"jql": "project = PROJ", "next_page_token": "<token from the previous result>"}`
    #[instrument(skip(self))]
    pub async fn search_issues(
        &self,
        params: SearchIssuesParams,
    ) -> anyhow::Result<SearchIssuesResult> {
        self.search_issues_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("search_issues", e))
    }

    /// Create an issue; the plain-text description becomes ADF paragraphs
    ///
    /// # Examples
    /// - `{"project_key": "PROJ", "summary": "Fix login", "issue_type": "Bug", "description": "Steps...\n\nExpected..."}`
    #[instrument(skip(self))]
    pub async fn create_issue(
        &self,
        params: CreateIssueParams,
    ) -> anyhow::Result<CreateIssueResult> {
        self.create_issue_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("create_issue", e))
    }

    /// Replace, append to or prepend to an issue description
    ///
    /// Append and prepend flatten the existing description to plain
    /// paragraphs: headings, lists and formatting become literal markdown text.
    #[instrument(skip(self))]
    pub async fn update_issue_description(
        &self,
        params: UpdateIssueDescriptionParams,
    ) -> anyhow::Result<UpdateIssueDescriptionResult> {
        self.update_description_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("update_issue_description", e))
    }

    /// Add a comment to an issue
    #[instrument(skip(self))]
    pub async fn add_comment(&self, params: AddCommentParams) -> anyhow::Result<AddCommentResult> {
        self.add_comment_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("add_comment", e))
    }

    /// List the comments of an issue rendered to markdown
    #[instrument(skip(self))]
    pub async fn get_comments(
        &self,
        params: GetCommentsParams,
    ) -> anyhow::Result<GetCommentsResult> {
        self.get_comments_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("get_comments", e))
    }

    /// Log time against an issue
    ///
    /// # Examples
    /// - `{"issue_key": "PROJ-123", "time_spent": "1h 30m", "comment": "Code review"}`
    #[instrument(skip(self))]
    pub async fn add_worklog(&self, params: AddWorklogParams) -> anyhow::Result<AddWorklogResult> {
        self.add_worklog_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("add_worklog", e))
    }

    /// List the worklogs of an issue
    #[instrument(skip(self))]
    pub async fn get_worklogs(
        &self,
        params: GetWorklogsParams,
    ) -> anyhow::Result<GetWorklogsResult> {
        self.get_worklogs_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("get_worklogs", e))
    }

    /// List projects visible to the authenticated user (cached)
    #[instrument(skip(self))]
    pub async fn list_projects(
        &self,
        params: ListProjectsParams,
    ) -> anyhow::Result<ListProjectsResult> {
        self.list_projects_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("list_projects", e))
    }

    /// List agile boards, optionally for one project (cached)
    #[instrument(skip(self))]
    pub async fn list_boards(&self, params: ListBoardsParams) -> anyhow::Result<ListBoardsResult> {
        self.list_boards_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("list_boards", e))
    }

    /// List the sprints of a board, optionally filtered by state
    #[instrument(skip(self))]
    pub async fn list_sprints(
        &self,
        params: ListSprintsParams,
    ) -> anyhow::Result<ListSprintsResult> {
        self.list_sprints_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("list_sprints", e))
    }

    /// Get server status and connection information
    #[instrument(skip(self))]
    pub async fn get_server_status(&self) -> anyhow::Result<JiraServerStatus> {
        info!("Getting server status");

        let (connection_status, authenticated_user) = match self.jira.current_user().await {
            Ok(user) => ("Connected".to_string(), Some(user.display_name)),
            Err(e) => (format!("Connection Error: {}", e), None),
        };

        Ok(JiraServerStatus {
            server_name: "Jira Tools MCP Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.get_uptime_seconds(),
            jira_url: self.config.jira_url.clone(),
            jira_connection_status: connection_status,
            authenticated_user,
            cache_stats: self.cache.get_stats(),
            tools_count: TOOLS_COUNT,
        })
    }

    /// Clear cached project, board and user metadata
    #[instrument(skip(self))]
    pub async fn clear_cache(&self) -> anyhow::Result<String> {
        info!("Clearing all cached metadata");

        match self.cache.clear_all() {
            Ok(()) => Ok("All cached metadata has been cleared successfully".to_string()),
            Err(e) => {
                error!("Failed to clear cache: {}", e);
                Err(anyhow::anyhow!("Failed to clear cache: {}", e))
            }
        }
    }

    /// Test the Jira connection and authentication
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> anyhow::Result<String> {
        info!("Testing Jira connection");

        match self.refresh_current_user_cache().await {
            Ok(user) => {
                info!("Connection test successful for user: {}", user.display_name);
                Ok(format!(
                    "✅ Connection successful!\n\
                     Jira URL: {}\n\
                     Authenticated as: {}\n\
                     Account ID: {}\n\
                     Email: {}",
                    self.jira.base_url(),
                    user.display_name,
                    user.account_id,
                    user.email_address.as_deref().unwrap_or("Not provided")
                ))
            }
            Err(e) => {
                error!("Connection test failed: {}", e);
                // Reported as a successful tool call so the agent sees the diagnosis
                Ok(format!(
                    "❌ Connection failed!\n\
                     Jira URL: {}\n\
                     Error: {}\n\
                     \n\
                     Please check:\n\
                     - Jira URL is correct and accessible\n\
                     - Authentication credentials are valid\n\
                     - Network connectivity to the Jira instance",
                    self.jira.base_url(),
                    e
                ))
            }
        }
    }
}
