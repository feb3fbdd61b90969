//! Project listing tool backed by the metadata cache

use super::{display_name, id_string, impl_json_display};
use crate::cache::{MetadataCache, ProjectInfo};
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::formatters;
use crate::jira_client::{ApiFamily, JiraApi};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Parameters for the list_projects tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListProjectsParams {
    /// Case-insensitive filter on project key or name (optional)
    pub query: Option<String>,
}

/// Result from the list_projects tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProjectsResult {
    pub projects: Vec<ProjectInfo>,
    pub total: usize,

    /// Whether the listing came from the cache
    pub cached: bool,

    pub markdown: String,
}

impl_json_display!(ListProjectsResult);

impl ProjectInfo {
    fn from_json(value: &Value) -> Option<Self> {
        let key = value.get("key")?.as_str()?.to_string();
        Some(Self {
            id: id_string(value),
            name: display_name(value, "/name", &key),
            project_type: value
                .get("projectTypeKey")
                .and_then(Value::as_str)
                .map(String::from),
            lead: value
                .pointer("/lead/displayName")
                .and_then(Value::as_str)
                .map(String::from),
            key,
        })
    }

    fn matches(&self, query: &str) -> bool {
        self.key.to_lowercase().contains(query) || self.name.to_lowercase().contains(query)
    }
}

/// Implementation of the list_projects tool
pub struct ListProjectsTool {
    jira: Arc<dyn JiraApi>,
    cache: Arc<MetadataCache>,
}

impl ListProjectsTool {
    pub fn new(jira: Arc<dyn JiraApi>, cache: Arc<MetadataCache>) -> Self {
        Self { jira, cache }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListProjectsParams) -> JiraMcpResult<ListProjectsResult> {
        let (all_projects, cached) = match self.cache.get_projects() {
            Some(projects) => {
                debug!("Using cached project listing");
                (projects, true)
            }
            None => (self.fetch_projects().await?, false),
        };

        let projects = match params
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty())
        {
            Some(query) => all_projects
                .into_iter()
                .filter(|project| project.matches(&query))
                .collect::<Vec<_>>(),
            None => all_projects,
        };

        Ok(ListProjectsResult {
            total: projects.len(),
            markdown: formatters::format_project_list(&projects),
            projects,
            cached,
        })
    }

    async fn fetch_projects(&self) -> JiraMcpResult<Vec<ProjectInfo>> {
        let response = self.jira.get_json(ApiFamily::Core, "/project").await?;
        let projects = response
            .as_array()
            .ok_or_else(|| JiraMcpError::internal("Project listing was not a JSON array"))?
            .iter()
            .filter_map(ProjectInfo::from_json)
            .collect::<Vec<_>>();

        info!("Fetched {} projects", projects.len());
        if let Err(e) = self.cache.set_projects(projects.clone()) {
            warn!("Failed to cache project listing: {}", e);
        }
        Ok(projects)
    }
}
