//! Issue tools: read, search, create and update descriptions
//!
//! Descriptions travel as ADF documents. Reads render them to markdown;
//! writes build a paragraph-only document from plain text.

use super::{display_name, id_string, impl_json_display};
use crate::adf;
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::formatters;
use crate::jira_client::{ApiFamily, JiraApi};
use crate::validation::{
    validate_issue_key, validate_limit, validate_project_key, validate_required_text,
    validate_text_length,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fields requested for a single issue
const ISSUE_FIELDS: &str =
    "summary,description,status,issuetype,priority,assignee,reporter,created,updated,labels";

/// Fields requested for each search hit
const SEARCH_FIELDS: [&str; 4] = ["summary", "status", "assignee", "description"];

/// Parameters for the get_issue tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetIssueParams {
    /// Jira issue key (required)
    /// Examples: "PROJ-123", "KEY-456"
    pub issue_key: String,

    /// Include comments in the rendered output (default: false)
    #[serde(default)]
    pub include_comments: bool,
}

/// Result from the get_issue tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetIssueResult {
    pub issue_key: String,
    pub summary: String,
    pub status: String,

    /// Description rendered to markdown
    pub description: String,

    /// Number of comments included, 0 unless requested
    pub comment_count: usize,

    /// Full issue view as markdown
    pub markdown: String,
}

/// Parameters for the search_issues tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchIssuesParams {
    /// JQL query (required)
    /// Examples: "project = PROJ AND status = 'In Progress'", "assignee = currentUser()"
    pub jql: String,

    /// Maximum results to return (optional, default and max from configuration)
    pub limit: Option<u32>,

    /// Token from a previous result's `next_page_token` to fetch the next page
    pub next_page_token: Option<String>,
}

/// One search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSummary {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,

    /// Plain-text description snippet
    pub snippet: String,
}

/// Result from the search_issues tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIssuesResult {
    pub jql: String,
    pub issues: Vec<IssueSummary>,

    /// Pass back as `next_page_token` to continue; absent on the last page
    pub next_page_token: Option<String>,
    pub is_last: bool,
    pub markdown: String,
}

/// Parameters for the create_issue tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateIssueParams {
    /// Project key (required), e.g. "PROJ"
    pub project_key: String,

    /// Issue summary line (required)
    pub summary: String,

    /// Issue type name (default: "Task")
    #[serde(default = "default_issue_type")]
    pub issue_type: String,

    /// Plain-text description; blank lines separate paragraphs
    pub description: Option<String>,
}

fn default_issue_type() -> String {
    "Task".to_string()
}

/// Result from the create_issue tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssueResult {
    pub issue_key: String,
    pub issue_id: String,
    pub url: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Replace the entire description
    Replace,
    /// Append content to the end of the description (default)
    #[default]
    Append,
    /// Prepend content to the beginning of the description
    Prepend,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Replace => "replace",
            UpdateMode::Append => "append",
            UpdateMode::Prepend => "prepend",
        }
    }
}

/// Parameters for the update_issue_description tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateIssueDescriptionParams {
    /// Jira issue key (required), e.g. "PROJ-123"
    pub issue_key: String,

    /// Plain-text content to write
    pub content: String,

    /// How to update the description: "replace", "append" (default), or "prepend".
    /// Append and prepend rewrite the existing description as plain
    /// paragraphs, so its headings, lists and formatting become literal text.
    #[serde(default)]
    pub mode: UpdateMode,
}

/// Result from the update_issue_description tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateIssueDescriptionResult {
    pub success: bool,
    pub issue_key: String,
    pub mode: String,

    /// The text the new description was built from
    pub new_description: String,
}

impl_json_display!(
    GetIssueResult,
    SearchIssuesResult,
    CreateIssueResult,
    UpdateIssueDescriptionResult,
);

/// Implementation of the get_issue tool
pub struct GetIssueTool {
    jira: Arc<dyn JiraApi>,
}

impl GetIssueTool {
    pub fn new(jira: Arc<dyn JiraApi>) -> Self {
        Self { jira }
    }

    #[instrument(skip(self), fields(issue_key = %params.issue_key))]
    pub async fn execute(&self, params: GetIssueParams) -> JiraMcpResult<GetIssueResult> {
        let issue_key = validate_issue_key(&params.issue_key)?;
        info!("Fetching issue {}", issue_key);

        let fields = if params.include_comments {
            format!("{},comment", ISSUE_FIELDS)
        } else {
            ISSUE_FIELDS.to_string()
        };
        let issue = self
            .jira
            .get_json(
                ApiFamily::Core,
                &format!("/issue/{}?fields={}", issue_key, fields),
            )
            .await
            .map_err(|e| e.for_resource("issue", &issue_key))?;

        let issue_fields = issue.get("fields").unwrap_or(&Value::Null);
        let comments = if params.include_comments {
            issue_fields
                .pointer("/comment/comments")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let mut markdown = formatters::format_issue(&issue);
        if params.include_comments {
            markdown.push('\n');
            markdown.push_str(&formatters::format_comments(&comments));
        }

        Ok(GetIssueResult {
            issue_key: display_name(&issue, "/key", &issue_key),
            summary: display_name(issue_fields, "/summary", ""),
            status: display_name(issue_fields, "/status/name", "Unknown"),
            description: adf::render_field(issue_fields.get("description"))
                .trim_end()
                .to_string(),
            comment_count: comments.len(),
            markdown,
        })
    }
}

/// Implementation of the search_issues tool
pub struct SearchIssuesTool {
    jira: Arc<dyn JiraApi>,
    max_results: u32,
}

impl SearchIssuesTool {
    pub fn new(jira: Arc<dyn JiraApi>, max_results: u32) -> Self {
        Self { jira, max_results }
    }

    #[instrument(skip(self), fields(jql = %params.jql))]
    pub async fn execute(&self, params: SearchIssuesParams) -> JiraMcpResult<SearchIssuesResult> {
        validate_required_text("jql", &params.jql)?;
        let limit = validate_limit(params.limit, self.max_results)?;
        let jql = params.jql.trim().to_string();

        info!(
            "Searching issues (limit {}, continuing: {})",
            limit,
            params.next_page_token.is_some()
        );

        let mut body = json!({
            "jql": jql,
            "maxResults": limit,
            "fields": SEARCH_FIELDS,
        });
        if let Some(token) = params.next_page_token.as_deref().filter(|t| !t.is_empty()) {
            body["nextPageToken"] = json!(token);
        }
        let response = self.jira.post_json("/search/jql", body).await?;

        let raw_issues = response
            .get("issues")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let next_page_token = response
            .get("nextPageToken")
            .and_then(Value::as_str)
            .map(String::from);
        let is_last = response
            .get("isLast")
            .and_then(Value::as_bool)
            .unwrap_or(next_page_token.is_none());

        let issues = raw_issues
            .iter()
            .map(|issue| {
                let fields = issue.get("fields").unwrap_or(&Value::Null);
                IssueSummary {
                    key: display_name(issue, "/key", "UNKNOWN"),
                    summary: display_name(fields, "/summary", ""),
                    status: display_name(fields, "/status/name", "Unknown"),
                    assignee: display_name(fields, "/assignee/displayName", "Unassigned"),
                    snippet: formatters::snippet(
                        &adf::plain_text_field(fields.get("description")),
                        formatters::SNIPPET_LENGTH,
                    ),
                }
            })
            .collect::<Vec<_>>();

        debug!("Search returned {} issues (last page: {})", issues.len(), is_last);

        Ok(SearchIssuesResult {
            markdown: formatters::format_issue_list(&raw_issues, !is_last),
            jql,
            issues,
            next_page_token,
            is_last,
        })
    }
}

/// Implementation of the create_issue tool
pub struct CreateIssueTool {
    jira: Arc<dyn JiraApi>,
}

impl CreateIssueTool {
    pub fn new(jira: Arc<dyn JiraApi>) -> Self {
        Self { jira }
    }

    #[instrument(skip(self), fields(project_key = %params.project_key))]
    pub async fn execute(&self, params: CreateIssueParams) -> JiraMcpResult<CreateIssueResult> {
        let project_key = validate_project_key(&params.project_key)?;
        validate_required_text("summary", &params.summary)?;
        validate_required_text("issue_type", &params.issue_type)?;
        if let Some(description) = &params.description {
            validate_text_length("description", description)?;
        }

        let mut fields = Map::new();
        fields.insert("project".to_string(), json!({ "key": project_key }));
        fields.insert("summary".to_string(), json!(params.summary.trim()));
        fields.insert("issuetype".to_string(), json!({ "name": params.issue_type.trim() }));
        if let Some(description) = adf::plain_text_to_field(params.description.as_deref()) {
            fields.insert("description".to_string(), description);
        }

        info!("Creating {} in project {}", params.issue_type, project_key);
        let created = self
            .jira
            .post_json("/issue", json!({ "fields": fields }))
            .await
            .map_err(|e| e.for_resource("project", &project_key))?;

        let issue_key = created
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| JiraMcpError::internal("Jira did not return the created issue key"))?
            .to_string();

        Ok(CreateIssueResult {
            url: format!("{}/browse/{}", self.jira.base_url(), issue_key),
            issue_id: id_string(&created),
            message: format!("Issue {} created successfully", issue_key),
            issue_key,
        })
    }
}

/// Implementation of the update_issue_description tool
pub struct UpdateIssueDescriptionTool {
    jira: Arc<dyn JiraApi>,
}

impl UpdateIssueDescriptionTool {
    pub fn new(jira: Arc<dyn JiraApi>) -> Self {
        Self { jira }
    }

    #[instrument(skip(self), fields(issue_key = %params.issue_key, mode = params.mode.as_str()))]
    pub async fn execute(
        &self,
        params: UpdateIssueDescriptionParams,
    ) -> JiraMcpResult<UpdateIssueDescriptionResult> {
        let issue_key = validate_issue_key(&params.issue_key)?;
        validate_required_text("content", &params.content)?;

        let new_description = match params.mode {
            UpdateMode::Replace => params.content.clone(),
            UpdateMode::Append | UpdateMode::Prepend => {
                debug!("Fetching current description for issue: {}", issue_key);
                let current = self
                    .jira
                    .get_json(
                        ApiFamily::Core,
                        &format!("/issue/{}?fields=description", issue_key),
                    )
                    .await
                    .map_err(|e| e.for_resource("issue", &issue_key))?;
                let current_text =
                    adf::render_field(current.pointer("/fields/description"));
                merge_description(current_text.trim(), &params.content, params.mode)
            }
        };
        validate_text_length("content", &new_description)?;

        let document = adf::plain_text_to_field(Some(&new_description)).ok_or_else(|| {
            JiraMcpError::invalid_param("content", "Description content cannot be empty")
        })?;

        self.jira
            .put_json(
                &format!("/issue/{}", issue_key),
                json!({ "fields": { "description": document } }),
            )
            .await
            .map_err(|e| e.for_resource("issue", &issue_key))?;

        info!("Updated description for issue {}", issue_key);

        Ok(UpdateIssueDescriptionResult {
            success: true,
            issue_key,
            mode: params.mode.as_str().to_string(),
            new_description,
        })
    }
}

fn merge_description(current: &str, content: &str, mode: UpdateMode) -> String {
    if current.is_empty() {
        return content.to_string();
    }
    match mode {
        UpdateMode::Replace => content.to_string(),
        UpdateMode::Append => format!("{}\n\n{}", current, content),
        UpdateMode::Prepend => format!("{}\n\n{}", content, current),
    }
}
