//! Worklog tools: log time against an issue and list logged work

use super::{display_name, id_string, impl_json_display};
use crate::adf;
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::formatters;
use crate::jira_client::{ApiFamily, JiraApi};
use crate::validation::{validate_issue_key, validate_text_length, validate_time_spent};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::format_description::{self, OwnedFormatItem};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

/// Timestamp layout Jira expects for `started`, e.g. `2024-03-01T09:00:00.000+0000`
const STARTED_FORMAT: &str =
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory][offset_minute]";

fn started_format() -> JiraMcpResult<OwnedFormatItem> {
    format_description::parse_owned::<2>(STARTED_FORMAT)
        .map_err(|e| JiraMcpError::internal(format!("Invalid worklog time format: {}", e)))
}

/// Format a timestamp the way Jira expects for worklog `started`
pub fn format_started(at: OffsetDateTime) -> JiraMcpResult<String> {
    at.format(&started_format()?)
        .map_err(|e| JiraMcpError::internal(format!("Failed to format start time: {}", e)))
}

/// Accept Jira's own layout or RFC 3339 and normalize to Jira's layout
pub fn parse_started(value: &str) -> JiraMcpResult<String> {
    let value = value.trim();
    let parsed = OffsetDateTime::parse(value, &started_format()?)
        .or_else(|_| OffsetDateTime::parse(value, &Rfc3339))
        .map_err(|_| {
            JiraMcpError::invalid_param(
                "started",
                format!(
                    "Start time must look like '2024-03-01T09:00:00.000+0000' or '2024-03-01T09:00:00Z', got '{}'",
                    value
                ),
            )
        })?;
    format_started(parsed)
}

/// Parameters for the add_worklog tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddWorklogParams {
    /// Jira issue key (required)
    pub issue_key: String,

    /// Time spent in Jira duration format (required)
    /// Examples: "2h", "1d 4h", "30m"
    pub time_spent: String,

    /// When the work started (optional, default: now)
    /// Examples: "2024-03-01T09:00:00.000+0000", "2024-03-01T09:00:00Z"
    pub started: Option<String>,

    /// Worklog comment (optional); blank lines separate paragraphs
    pub comment: Option<String>,
}

/// Result from the add_worklog tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddWorklogResult {
    pub issue_key: String,
    pub worklog_id: String,
    pub time_spent: String,
    pub started: String,
    pub message: String,
}

/// Parameters for the get_worklogs tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetWorklogsParams {
    /// Jira issue key (required)
    pub issue_key: String,
}

/// A worklog with its comment rendered to markdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorklogView {
    pub id: String,
    pub author: String,
    pub time_spent: String,
    pub time_spent_seconds: u64,
    pub started: Option<String>,
    pub comment: String,
}

/// Result from the get_worklogs tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWorklogsResult {
    pub issue_key: String,
    pub total: usize,
    pub total_time_spent_seconds: u64,
    pub worklogs: Vec<WorklogView>,
    pub markdown: String,
}

impl_json_display!(AddWorklogResult, GetWorklogsResult);

/// Implementation of the add_worklog tool
pub struct AddWorklogTool {
    jira: Arc<dyn JiraApi>,
}

impl AddWorklogTool {
    pub fn new(jira: Arc<dyn JiraApi>) -> Self {
        Self { jira }
    }

    #[instrument(skip(self), fields(issue_key = %params.issue_key, time_spent = %params.time_spent))]
    pub async fn execute(&self, params: AddWorklogParams) -> JiraMcpResult<AddWorklogResult> {
        let issue_key = validate_issue_key(&params.issue_key)?;
        let time_spent = validate_time_spent(&params.time_spent)?;
        let started = match params.started.as_deref() {
            Some(started) => parse_started(started)?,
            None => format_started(OffsetDateTime::now_utc())?,
        };

        let mut body = Map::new();
        body.insert("timeSpent".to_string(), json!(time_spent));
        body.insert("started".to_string(), json!(started));
        if let Some(comment) = &params.comment {
            validate_text_length("comment", comment)?;
        }
        if let Some(comment) = adf::plain_text_to_field(params.comment.as_deref()) {
            body.insert("comment".to_string(), comment);
        }

        debug!("Logging {} on {} starting {}", time_spent, issue_key, started);
        let created = self
            .jira
            .post_json(
                &format!("/issue/{}/worklog", issue_key),
                Value::Object(body),
            )
            .await
            .map_err(|e| e.for_resource("issue", &issue_key))?;

        info!("Logged {} on issue {}", time_spent, issue_key);

        Ok(AddWorklogResult {
            worklog_id: id_string(&created),
            message: format!("Logged {} on issue {}", time_spent, issue_key),
            issue_key,
            time_spent,
            started,
        })
    }
}

/// Implementation of the get_worklogs tool
pub struct GetWorklogsTool {
    jira: Arc<dyn JiraApi>,
}

impl GetWorklogsTool {
    pub fn new(jira: Arc<dyn JiraApi>) -> Self {
        Self { jira }
    }

    #[instrument(skip(self), fields(issue_key = %params.issue_key))]
    pub async fn execute(&self, params: GetWorklogsParams) -> JiraMcpResult<GetWorklogsResult> {
        let issue_key = validate_issue_key(&params.issue_key)?;

        let response = self
            .jira
            .get_json(ApiFamily::Core, &format!("/issue/{}/worklog", issue_key))
            .await
            .map_err(|e| e.for_resource("issue", &issue_key))?;

        let raw = response
            .get("worklogs")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let worklogs = raw
            .iter()
            .map(|worklog| WorklogView {
                id: id_string(worklog),
                author: display_name(worklog, "/author/displayName", "Unknown"),
                time_spent: display_name(worklog, "/timeSpent", "0m"),
                time_spent_seconds: worklog
                    .get("timeSpentSeconds")
                    .and_then(Value::as_u64)
                    .unwrap_or(0),
                started: worklog
                    .get("started")
                    .and_then(Value::as_str)
                    .map(String::from),
                comment: adf::render_field(worklog.get("comment"))
                    .trim_end()
                    .to_string(),
            })
            .collect::<Vec<_>>();

        Ok(GetWorklogsResult {
            issue_key,
            total: worklogs.len(),
            total_time_spent_seconds: worklogs.iter().map(|w| w.time_spent_seconds).sum(),
            markdown: formatters::format_worklogs(&raw),
            worklogs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jira_client::testing::FakeJira;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[test]
    fn test_format_started_uses_jira_layout() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(format_started(at).unwrap(), "2023-11-14T22:13:20.000+0000");
    }

    #[rstest]
    #[case("2024-03-01T09:00:00.000+0000", "2024-03-01T09:00:00.000+0000")]
    #[case("2024-03-01T09:00:00Z", "2024-03-01T09:00:00.000+0000")]
    #[case(" 2024-03-01T09:00:00+02:00 ", "2024-03-01T09:00:00.000+0200")]
    fn test_parse_started(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_started(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_started_rejects_dates_only() {
        assert_matches!(
            parse_started("yesterday"),
            Err(JiraMcpError::InvalidParameter { ref parameter, .. }) if parameter == "started"
        );
    }

    #[tokio::test]
    async fn test_add_worklog_without_comment_omits_field() {
        let fake = Arc::new(FakeJira::new().respond("/issue/DEV-1/worklog", json!({"id": "77"})));
        let result = AddWorklogTool::new(fake.clone())
            .execute(AddWorklogParams {
                issue_key: "DEV-1".to_string(),
                time_spent: "1H 30M".to_string(),
                started: Some("2024-03-01T09:00:00Z".to_string()),
                comment: Some("   ".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.worklog_id, "77");
        assert_eq!(
            fake.last_body(),
            json!({"timeSpent": "1h 30m", "started": "2024-03-01T09:00:00.000+0000"})
        );
    }

    #[tokio::test]
    async fn test_add_worklog_defaults_started_to_now() {
        let fake = Arc::new(FakeJira::new().respond("/issue/DEV-1/worklog", json!({"id": 78})));
        let result = AddWorklogTool::new(fake.clone())
            .execute(AddWorklogParams {
                issue_key: "DEV-1".to_string(),
                time_spent: "2h".to_string(),
                started: None,
                comment: Some("Pairing".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.worklog_id, "78");
        // Real milliseconds are kept; only the layout is fixed
        let started = OffsetDateTime::parse(&result.started, &started_format().unwrap()).unwrap();
        assert_eq!(started.offset(), time::UtcOffset::UTC);
        assert_eq!(result.started.len(), "2024-03-01T09:00:00.000+0000".len());
        assert!(result.started.ends_with("+0000"));
        assert_eq!(fake.last_body()["started"], result.started.as_str());
        assert_eq!(
            fake.last_body()["comment"]["content"][0]["content"][0]["text"],
            "Pairing"
        );
    }

    #[tokio::test]
    async fn test_add_worklog_rejects_bad_duration() {
        let fake = Arc::new(FakeJira::new());
        let err = AddWorklogTool::new(fake)
            .execute(AddWorklogParams {
                issue_key: "DEV-1".to_string(),
                time_spent: "an hour".to_string(),
                started: None,
                comment: None,
            })
            .await
            .unwrap_err();
        assert_matches!(err, JiraMcpError::InvalidParameter { .. });
    }

    #[tokio::test]
    async fn test_get_worklogs_sums_time() {
        let fake = Arc::new(FakeJira::new().respond(
            "/issue/DEV-3/worklog",
            json!({
                "worklogs": [
                    {"id": "1", "author": {"displayName": "Bob"}, "timeSpent": "1h", "timeSpentSeconds": 3600,
                     "comment": {"type": "doc", "version": 1, "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Review", "marks": [{"type": "em"}]}]}]}},
                    {"id": "2", "timeSpent": "30m", "timeSpentSeconds": 1800}
                ]
            }),
        ));
        let result = GetWorklogsTool::new(fake)
            .execute(GetWorklogsParams {
                issue_key: "DEV-3".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.total, 2);
        assert_eq!(result.total_time_spent_seconds, 5400);
        assert_eq!(result.worklogs[0].comment, "*Review*");
        assert!(result.markdown.contains("### Bob logged 1h"));
    }
}
