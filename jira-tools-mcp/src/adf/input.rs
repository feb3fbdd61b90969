//! Boundary type for rich-text fields
//!
//! Older Jira deployments (and the v2 REST API) send descriptions and
//! comment bodies as plain strings while Cloud v3 sends ADF documents.
//! `AdfInput` makes the three possible shapes explicit.

use crate::adf::node::AdfNode;
use serde_json::Value;
use tracing::debug;

/// A rich-text field as received from Jira
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdfInput {
    /// A structured ADF tree
    Document(AdfNode),
    /// A legacy plain-text field, passed through untouched
    PlainString(String),
    /// `null` or a missing field
    #[default]
    Absent,
}

impl AdfInput {
    /// Classify an optional JSON field
    pub fn from_field(value: Option<&Value>) -> Self {
        match value {
            None => AdfInput::Absent,
            Some(value) => AdfInput::from(value),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, AdfInput::Absent)
    }
}

impl From<&Value> for AdfInput {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => AdfInput::Absent,
            Value::String(text) => AdfInput::PlainString(text.clone()),
            Value::Object(_) => AdfInput::Document(AdfNode::from(value)),
            other => {
                debug!("Ignoring non-document rich-text value: {}", other);
                AdfInput::Absent
            }
        }
    }
}

impl From<AdfNode> for AdfInput {
    fn from(node: AdfNode) -> Self {
        AdfInput::Document(node)
    }
}

impl From<&str> for AdfInput {
    fn from(text: &str) -> Self {
        AdfInput::PlainString(text.to_string())
    }
}

impl From<String> for AdfInput {
    fn from(text: String) -> Self {
        AdfInput::PlainString(text)
    }
}

impl<T: Into<AdfInput>> From<Option<T>> for AdfInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_json_values() {
        assert_eq!(AdfInput::from(&json!(null)), AdfInput::Absent);
        assert_eq!(
            AdfInput::from(&json!("legacy text")),
            AdfInput::PlainString("legacy text".to_string())
        );
        assert!(matches!(
            AdfInput::from(&json!({"type": "doc", "version": 1, "content": []})),
            AdfInput::Document(AdfNode::Doc { .. })
        ));
        assert_eq!(AdfInput::from(&json!(12)), AdfInput::Absent);
        assert_eq!(AdfInput::from(&json!([1, 2])), AdfInput::Absent);
    }

    #[test]
    fn test_from_field() {
        let fields = json!({"description": "text"});
        assert_eq!(
            AdfInput::from_field(fields.get("description")),
            AdfInput::PlainString("text".to_string())
        );
        assert!(AdfInput::from_field(fields.get("missing")).is_absent());
    }

    #[test]
    fn test_from_option() {
        let none: Option<&str> = None;
        assert!(AdfInput::from(none).is_absent());
        assert_eq!(
            AdfInput::from(Some("x")),
            AdfInput::PlainString("x".to_string())
        );
    }
}
