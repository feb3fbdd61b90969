//! Error types and handling for the Jira tools server
//!
//! Structured errors that map to MCP JSON-RPC error codes, plus conversions
//! from the errors of the crates the server depends on. The ADF conversion
//! core never produces these; they come from configuration, parameter
//! validation and the HTTP layer.

use serde_json::Value;
use thiserror::Error;

/// Errors raised by the Jira tools server
#[derive(Debug, Error)]
pub enum JiraMcpError {
    /// Configuration errors (-32001)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Authentication failures (-32002)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network errors and timeouts (-32003)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Permission denied errors (-32004)
    #[error("Permission denied: {message}")]
    Permission { message: String },

    /// Resource not found errors (-32005)
    #[error("Not found: {resource} '{key}' not found")]
    NotFound { resource: String, key: String },

    /// Invalid parameter errors (-32006)
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Cache errors (internal, reported in the network category)
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Internal server errors, including undecodable responses
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl JiraMcpError {
    /// MCP JSON-RPC error code for this error
    pub fn error_code(&self) -> i32 {
        match self {
            JiraMcpError::Configuration { .. } => -32001,
            JiraMcpError::Authentication { .. } => -32002,
            JiraMcpError::Network { .. } => -32003,
            JiraMcpError::Permission { .. } => -32004,
            JiraMcpError::NotFound { .. } => -32005,
            JiraMcpError::InvalidParameter { .. } => -32006,
            JiraMcpError::Cache { .. } => -32003,
            JiraMcpError::Internal { .. } => -32603,
        }
    }

    /// Error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            JiraMcpError::Configuration { .. } => "configuration",
            JiraMcpError::Authentication { .. } => "authentication",
            JiraMcpError::Network { .. } => "network",
            JiraMcpError::Permission { .. } => "permission",
            JiraMcpError::NotFound { .. } => "not_found",
            JiraMcpError::InvalidParameter { .. } => "invalid_parameter",
            JiraMcpError::Cache { .. } => "cache",
            JiraMcpError::Internal { .. } => "internal",
        }
    }

    /// Additional data attached to MCP error responses
    pub fn error_data(&self) -> Value {
        let mut data = serde_json::Map::new();
        data.insert(
            "category".to_string(),
            Value::String(self.category().to_string()),
        );

        match self {
            JiraMcpError::NotFound { resource, key } => {
                data.insert("resource".to_string(), Value::String(resource.clone()));
                data.insert("key".to_string(), Value::String(key.clone()));
            }
            JiraMcpError::InvalidParameter { parameter, .. } => {
                data.insert("parameter".to_string(), Value::String(parameter.clone()));
            }
            _ => {}
        }

        Value::Object(data)
    }

    pub fn config(message: impl Into<String>) -> Self {
        JiraMcpError::Configuration {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        JiraMcpError::Authentication {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        JiraMcpError::Network {
            message: message.into(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        JiraMcpError::Permission {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, key: impl Into<String>) -> Self {
        JiraMcpError::NotFound {
            resource: resource.into(),
            key: key.into(),
        }
    }

    pub fn invalid_param(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        JiraMcpError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        JiraMcpError::Cache {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        JiraMcpError::Internal {
            message: message.into(),
        }
    }

    /// Replace the generic path-based not-found with a named resource
    pub fn for_resource(self, resource: &str, key: &str) -> Self {
        match self {
            JiraMcpError::NotFound { .. } => JiraMcpError::not_found(resource, key),
            other => other,
        }
    }
}

/// Convert from gouqi errors
impl From<gouqi::Error> for JiraMcpError {
    fn from(err: gouqi::Error) -> Self {
        match err {
            gouqi::Error::Http(_) => JiraMcpError::network(format!("HTTP error: {}", err)),
            gouqi::Error::IO(_) => JiraMcpError::network(format!("IO error: {}", err)),
            gouqi::Error::Serde(_) => {
                JiraMcpError::internal(format!("Failed to decode Jira response: {}", err))
            }
            gouqi::Error::Unauthorized => JiraMcpError::auth("Jira rejected the credentials"),
            gouqi::Error::NotFound => JiraMcpError::not_found("resource", "unknown"),
            gouqi::Error::Fault { .. } => {
                JiraMcpError::internal(format!("Jira API error: {}", err))
            }
            _ => JiraMcpError::internal(format!("Jira client error: {}", err)),
        }
    }
}

impl From<serde_json::Error> for JiraMcpError {
    fn from(err: serde_json::Error) -> Self {
        JiraMcpError::internal(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for JiraMcpError {
    fn from(err: toml::de::Error) -> Self {
        JiraMcpError::config(format!("TOML parsing error: {}", err))
    }
}

/// Classify a generic error by its message
impl From<anyhow::Error> for JiraMcpError {
    fn from(err: anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        let lower_message = message.to_lowercase();

        if lower_message.contains("authentication") || lower_message.contains("unauthorized") {
            JiraMcpError::auth(message)
        } else if lower_message.contains("not found") || lower_message.contains("404") {
            JiraMcpError::not_found("resource", "unknown")
        } else if lower_message.contains("permission")
            || lower_message.contains("forbidden")
            || lower_message.contains("403")
        {
            JiraMcpError::permission(message)
        } else if lower_message.contains("network")
            || lower_message.contains("connection")
            || lower_message.contains("timeout")
        {
            JiraMcpError::network(message)
        } else if lower_message.contains("config") || lower_message.contains("jira_") {
            JiraMcpError::config(message)
        } else {
            JiraMcpError::internal(message)
        }
    }
}

/// Result type alias for server operations
pub type JiraMcpResult<T> = Result<T, JiraMcpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_error_codes() {
        assert_eq!(JiraMcpError::config("test").error_code(), -32001);
        assert_eq!(JiraMcpError::auth("test").error_code(), -32002);
        assert_eq!(JiraMcpError::network("test").error_code(), -32003);
        assert_eq!(JiraMcpError::permission("test").error_code(), -32004);
        assert_eq!(
            JiraMcpError::not_found("issue", "KEY-123").error_code(),
            -32005
        );
        assert_eq!(
            JiraMcpError::invalid_param("time_spent", "invalid").error_code(),
            -32006
        );
        assert_eq!(JiraMcpError::internal("boom").error_code(), -32603);
    }

    #[test]
    fn test_error_data() {
        let data = JiraMcpError::not_found("issue", "KEY-123").error_data();
        assert_eq!(data["category"], "not_found");
        assert_eq!(data["resource"], "issue");
        assert_eq!(data["key"], "KEY-123");

        let data = JiraMcpError::invalid_param("comment", "too long").error_data();
        assert_eq!(data["parameter"], "comment");

        let data = JiraMcpError::network("down").error_data();
        assert_eq!(data["category"], "network");
        assert!(data.get("key").is_none());
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: JiraMcpError = anyhow::anyhow!("Authentication failed").into();
        assert_matches!(err, JiraMcpError::Authentication { .. });

        let err: JiraMcpError = anyhow::anyhow!("Issue not found").into();
        assert_matches!(err, JiraMcpError::NotFound { .. });

        let err: JiraMcpError = anyhow::anyhow!("403 Forbidden").into();
        assert_matches!(err, JiraMcpError::Permission { .. });

        let err: JiraMcpError = anyhow::anyhow!("JIRA_URL is required").into();
        assert_matches!(err, JiraMcpError::Configuration { .. });

        let err: JiraMcpError = anyhow::anyhow!("something odd").into();
        assert_matches!(err, JiraMcpError::Internal { .. });
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<Value>("{not json").unwrap_err();
        let err: JiraMcpError = parse_err.into();
        assert_eq!(err.category(), "internal");
    }
}
