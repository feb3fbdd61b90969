//! Agile board and sprint listing tools
//!
//! Boards and sprints live on the Jira Software REST API. Board listings are
//! cached per project filter; sprint states change too often to cache.

use super::{display_name, impl_json_display};
use crate::cache::{BoardInfo, MetadataCache};
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::formatters;
use crate::jira_client::{ApiFamily, JiraApi};
use crate::validation::validate_project_key;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const SPRINT_STATES: [&str; 3] = ["active", "future", "closed"];

/// Parameters for the list_boards tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListBoardsParams {
    /// Only boards of this project (optional), e.g. "PROJ"
    pub project_key: Option<String>,
}

/// Result from the list_boards tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBoardsResult {
    pub boards: Vec<BoardInfo>,
    pub total: usize,
    pub cached: bool,
    pub markdown: String,
}

/// Parameters for the list_sprints tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListSprintsParams {
    /// Board id (required), as returned by list_boards
    pub board_id: u64,

    /// Sprint state filter (optional)
    /// Examples: "active", "future", "closed", "active,future"
    pub state: Option<String>,
}

/// Sprint summary as listed by `GET /board/{id}/sprint`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintInfo {
    pub id: u64,
    pub name: String,
    pub state: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub goal: Option<String>,
}

/// Result from the list_sprints tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSprintsResult {
    pub board_id: u64,
    pub sprints: Vec<SprintInfo>,
    pub total: usize,
    pub markdown: String,
}

impl_json_display!(ListBoardsResult, ListSprintsResult);

fn optional_text(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(String::from)
}

impl BoardInfo {
    fn from_json(value: &Value) -> Option<Self> {
        Some(Self {
            id: value.get("id")?.as_u64()?,
            name: display_name(value, "/name", "(unnamed board)"),
            board_type: display_name(value, "/type", "unknown"),
            project_key: value
                .pointer("/location/projectKey")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }
}

impl SprintInfo {
    fn from_json(value: &Value) -> Option<Self> {
        Some(Self {
            id: value.get("id")?.as_u64()?,
            name: display_name(value, "/name", "(unnamed sprint)"),
            state: display_name(value, "/state", "unknown"),
            start_date: optional_text(value, "startDate"),
            end_date: optional_text(value, "endDate"),
            goal: optional_text(value, "goal"),
        })
    }
}

/// Paged agile listings wrap their entries in `values`
fn agile_values(response: &Value, what: &str) -> JiraMcpResult<Vec<Value>> {
    response
        .get("values")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| JiraMcpError::internal(format!("{} listing had no 'values' array", what)))
}

/// Validate a comma-separated sprint state filter, normalized to lowercase
fn validate_sprint_state(state: &str) -> JiraMcpResult<String> {
    let states = state
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    if states.is_empty() {
        return Err(JiraMcpError::invalid_param(
            "state",
            "State filter cannot be empty if provided",
        ));
    }
    if let Some(bad) = states.iter().find(|s| !SPRINT_STATES.contains(&s.as_str())) {
        return Err(JiraMcpError::invalid_param(
            "state",
            format!(
                "Unknown sprint state '{}'. Use one of: {}",
                bad,
                SPRINT_STATES.join(", ")
            ),
        ));
    }
    Ok(states.join(","))
}

/// Implementation of the list_boards tool
pub struct ListBoardsTool {
    jira: Arc<dyn JiraApi>,
    cache: Arc<MetadataCache>,
}

impl ListBoardsTool {
    pub fn new(jira: Arc<dyn JiraApi>, cache: Arc<MetadataCache>) -> Self {
        Self { jira, cache }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListBoardsParams) -> JiraMcpResult<ListBoardsResult> {
        let project_key = params
            .project_key
            .as_deref()
            .map(validate_project_key)
            .transpose()?;

        if let Some(boards) = self.cache.get_boards(project_key.as_deref()) {
            debug!("Using cached board listing for {:?}", project_key);
            return Ok(ListBoardsResult {
                total: boards.len(),
                markdown: formatters::format_board_list(&boards),
                boards,
                cached: true,
            });
        }

        let path = match &project_key {
            Some(key) => format!("/board?projectKeyOrId={}", key),
            None => "/board".to_string(),
        };
        let response = self
            .jira
            .get_json(ApiFamily::Agile, &path)
            .await
            .map_err(|e| match &project_key {
                Some(key) => e.for_resource("project", key),
                None => e,
            })?;

        let boards = agile_values(&response, "Board")?
            .iter()
            .filter_map(BoardInfo::from_json)
            .collect::<Vec<_>>();
        info!("Fetched {} boards", boards.len());

        if let Err(e) = self.cache.set_boards(project_key, boards.clone()) {
            warn!("Failed to cache board listing: {}", e);
        }

        Ok(ListBoardsResult {
            total: boards.len(),
            markdown: formatters::format_board_list(&boards),
            boards,
            cached: false,
        })
    }
}

/// Implementation of the list_sprints tool
pub struct ListSprintsTool {
    jira: Arc<dyn JiraApi>,
}

impl ListSprintsTool {
    pub fn new(jira: Arc<dyn JiraApi>) -> Self {
        Self { jira }
    }

    #[instrument(skip(self), fields(board_id = params.board_id))]
    pub async fn execute(&self, params: ListSprintsParams) -> JiraMcpResult<ListSprintsResult> {
        let state = params
            .state
            .as_deref()
            .map(validate_sprint_state)
            .transpose()?;

        let path = match &state {
            Some(state) => format!("/board/{}/sprint?state={}", params.board_id, state),
            None => format!("/board/{}/sprint", params.board_id),
        };
        let response = self
            .jira
            .get_json(ApiFamily::Agile, &path)
            .await
            .map_err(|e| e.for_resource("board", &params.board_id.to_string()))?;

        let sprints = agile_values(&response, "Sprint")?
            .iter()
            .filter_map(SprintInfo::from_json)
            .collect::<Vec<_>>();
        info!("Fetched {} sprints for board {}", sprints.len(), params.board_id);

        Ok(ListSprintsResult {
            board_id: params.board_id,
            total: sprints.len(),
            markdown: formatters::format_sprint_list(&sprints),
            sprints,
        })
    }
}
