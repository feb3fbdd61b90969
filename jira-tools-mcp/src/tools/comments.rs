//! Comment tools for Jira issues

use super::{display_name, id_string, impl_json_display};
use crate::adf;
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::formatters;
use crate::jira_client::{ApiFamily, JiraApi};
use crate::validation::{validate_issue_key, validate_text_length};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the add_comment tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddCommentParams {
    /// Jira issue key (required)
    /// Examples: "PROJ-123", "KEY-456"
    pub issue_key: String,

    /// Comment text (required); blank lines separate paragraphs
    pub comment_body: String,
}

/// Result from the add_comment tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentResult {
    pub issue_key: String,
    pub comment_id: String,
    pub created: Option<String>,
    pub message: String,
}

/// Parameters for the get_comments tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetCommentsParams {
    /// Jira issue key (required)
    pub issue_key: String,
}

/// A comment with its body rendered to markdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: String,
    pub author: String,
    pub created: Option<String>,
    pub body: String,
}

/// Result from the get_comments tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCommentsResult {
    pub issue_key: String,
    pub total: usize,
    pub comments: Vec<CommentView>,
    pub markdown: String,
}

impl_json_display!(AddCommentResult, GetCommentsResult);

/// Implementation of the add_comment tool
pub struct AddCommentTool {
    jira: Arc<dyn JiraApi>,
}

impl AddCommentTool {
    pub fn new(jira: Arc<dyn JiraApi>) -> Self {
        Self { jira }
    }

    #[instrument(skip(self), fields(
        issue_key = params.issue_key.as_str(),
        comment_length = params.comment_body.len(),
    ))]
    pub async fn execute(&self, params: AddCommentParams) -> JiraMcpResult<AddCommentResult> {
        let issue_key = validate_issue_key(&params.issue_key)?;
        validate_text_length("comment_body", &params.comment_body)?;

        let body = adf::plain_text_to_field(Some(&params.comment_body)).ok_or_else(|| {
            JiraMcpError::invalid_param("comment_body", "Comment body cannot be empty")
        })?;

        info!("Adding comment to issue: {}", issue_key);
        let created = self
            .jira
            .post_json(
                &format!("/issue/{}/comment", issue_key),
                json!({ "body": body }),
            )
            .await
            .map_err(|e| e.for_resource("issue", &issue_key))?;

        Ok(AddCommentResult {
            comment_id: id_string(&created),
            created: created
                .get("created")
                .and_then(Value::as_str)
                .map(String::from),
            message: format!("Comment successfully added to issue {}", issue_key),
            issue_key,
        })
    }
}

/// Implementation of the get_comments tool
pub struct GetCommentsTool {
    jira: Arc<dyn JiraApi>,
}

impl GetCommentsTool {
    pub fn new(jira: Arc<dyn JiraApi>) -> Self {
        Self { jira }
    }

    #[instrument(skip(self), fields(issue_key = %params.issue_key))]
    pub async fn execute(&self, params: GetCommentsParams) -> JiraMcpResult<GetCommentsResult> {
        let issue_key = validate_issue_key(&params.issue_key)?;

        let response = self
            .jira
            .get_json(ApiFamily::Core, &format!("/issue/{}/comment", issue_key))
            .await
            .map_err(|e| e.for_resource("issue", &issue_key))?;

        let raw = response
            .get("comments")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let comments = raw
            .iter()
            .map(|comment| CommentView {
                id: id_string(comment),
                author: display_name(comment, "/author/displayName", "Unknown"),
                created: comment
                    .get("created")
                    .and_then(Value::as_str)
                    .map(String::from),
                body: adf::render_field(comment.get("body")).trim_end().to_string(),
            })
            .collect::<Vec<_>>();

        info!("Fetched {} comments for {}", comments.len(), issue_key);

        Ok(GetCommentsResult {
            issue_key,
            total: comments.len(),
            markdown: formatters::format_comments(&raw),
            comments,
        })
    }
}
