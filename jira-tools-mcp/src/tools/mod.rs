//! Tools module for the Jira tools MCP server
//!
//! Each tool is a small struct over [`JiraApi`](crate::jira_client::JiraApi)
//! with an `execute(params)` method; the server exposes them through its
//! `#[mcp_tools]` impl.

/// Render tool results as JSON when displayed.
///
/// Workaround for pulseengine-mcp-macros: the generated tool handlers format
/// results with `Display`, so it has to produce the serialized JSON.
macro_rules! impl_json_display {
    ($($result:ty),+ $(,)?) => {
        $(
            impl std::fmt::Display for $result {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    match serde_json::to_string(self) {
                        Ok(json) => write!(f, "{}", json),
                        Err(_) => write!(
                            f,
                            "{{\"error\": \"Failed to serialize {}\"}}",
                            stringify!($result)
                        ),
                    }
                }
            }
        )+
    };
}

pub(crate) use impl_json_display;

pub mod boards;
pub mod comments;
pub mod issues;
pub mod projects;
pub mod worklogs;

pub use boards::*;
pub use comments::*;
pub use issues::*;
pub use projects::*;
pub use worklogs::*;

use serde_json::Value;

/// Display name at `pointer`, or `fallback` when missing
pub(crate) fn display_name(value: &Value, pointer: &str, fallback: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Jira returns ids as strings on the core API and numbers on the agile API
pub(crate) fn id_string(value: &Value) -> String {
    match value.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    }
}
