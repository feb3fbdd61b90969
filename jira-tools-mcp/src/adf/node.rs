//! Atlassian Document Format node model
//!
//! Jira returns rich text (issue descriptions, comment bodies, worklog
//! comments) as a tree of JSON objects discriminated by a `type` string.
//! This module models that tree as a closed enum and converts to and from
//! `serde_json::Value` without ever failing: malformed input degrades to
//! unknown containers or empty fields instead of errors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

/// Open-ended attribute mapping carried by nodes and marks
pub type Attrs = Map<String, Value>;

/// Schema version stamped on every document this crate builds
pub const ADF_VERSION: u64 = 1;

/// A single ADF node
///
/// Children are owned, so a tree can never share a node between two
/// parents and can never contain a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum AdfNode {
    Doc {
        version: u64,
        content: Vec<AdfNode>,
    },
    Paragraph {
        content: Vec<AdfNode>,
    },
    Text {
        text: String,
        marks: Vec<Mark>,
    },
    CodeBlock {
        attrs: Attrs,
        content: Vec<AdfNode>,
    },
    BulletList {
        content: Vec<AdfNode>,
    },
    OrderedList {
        attrs: Attrs,
        content: Vec<AdfNode>,
    },
    ListItem {
        content: Vec<AdfNode>,
    },
    Heading {
        attrs: Attrs,
        content: Vec<AdfNode>,
    },
    Blockquote {
        content: Vec<AdfNode>,
    },
    HardBreak,
    Rule,
    /// Any node type outside the vocabulary above (panels, tables,
    /// mentions, media...). Rendered as a plain container.
    Unknown {
        node_type: String,
        attrs: Attrs,
        content: Vec<AdfNode>,
    },
}

/// Inline formatting applied to a text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Mark {
    Strong,
    Em,
    Code,
    Strike,
    /// `href` is `None` when the attribute is missing or not a string
    Link { href: Option<String>, attrs: Attrs },
    Other { mark_type: String, attrs: Attrs },
}

impl AdfNode {
    /// Build a `doc` root around the given blocks
    pub fn doc(content: Vec<AdfNode>) -> Self {
        AdfNode::Doc {
            version: ADF_VERSION,
            content,
        }
    }

    /// Build a paragraph around the given inline nodes
    pub fn paragraph(content: Vec<AdfNode>) -> Self {
        AdfNode::Paragraph { content }
    }

    /// Build an unmarked text node
    pub fn text(text: impl Into<String>) -> Self {
        AdfNode::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// The wire `type` tag of this node
    pub fn node_type(&self) -> &str {
        match self {
            AdfNode::Doc { .. } => "doc",
            AdfNode::Paragraph { .. } => "paragraph",
            AdfNode::Text { .. } => "text",
            AdfNode::CodeBlock { .. } => "codeBlock",
            AdfNode::BulletList { .. } => "bulletList",
            AdfNode::OrderedList { .. } => "orderedList",
            AdfNode::ListItem { .. } => "listItem",
            AdfNode::Heading { .. } => "heading",
            AdfNode::Blockquote { .. } => "blockquote",
            AdfNode::HardBreak => "hardBreak",
            AdfNode::Rule => "rule",
            AdfNode::Unknown { node_type, .. } => node_type,
        }
    }

    /// Child nodes; leaves return an empty slice
    pub fn children(&self) -> &[AdfNode] {
        match self {
            AdfNode::Doc { content, .. }
            | AdfNode::Paragraph { content }
            | AdfNode::CodeBlock { content, .. }
            | AdfNode::BulletList { content }
            | AdfNode::OrderedList { content, .. }
            | AdfNode::ListItem { content }
            | AdfNode::Heading { content, .. }
            | AdfNode::Blockquote { content }
            | AdfNode::Unknown { content, .. } => content,
            AdfNode::Text { .. } | AdfNode::HardBreak | AdfNode::Rule => &[],
        }
    }

    /// Heading level clamped to `1..=6`; missing or non-numeric levels are 1
    pub fn heading_level(attrs: &Attrs) -> usize {
        let level = attrs
            .get("level")
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(1);
        level.clamp(1, 6) as usize
    }

    /// Code block language, empty when missing or not a string
    pub fn code_language(attrs: &Attrs) -> &str {
        attrs
            .get("language")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

fn children_from(object: &Map<String, Value>) -> Vec<AdfNode> {
    object
        .get("content")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(AdfNode::from)
                .collect()
        })
        .unwrap_or_default()
}

fn attrs_from(object: &Map<String, Value>) -> Attrs {
    object
        .get("attrs")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn marks_from(object: &Map<String, Value>) -> Vec<Mark> {
    object
        .get("marks")
        .and_then(Value::as_array)
        .map(|marks| {
            marks
                .iter()
                .filter(|mark| mark.is_object())
                .map(Mark::from)
                .collect()
        })
        .unwrap_or_default()
}

impl From<&Value> for AdfNode {
    fn from(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            trace!("Non-object ADF value treated as empty container");
            return AdfNode::Unknown {
                node_type: String::new(),
                attrs: Attrs::new(),
                content: Vec::new(),
            };
        };

        let node_type = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default();

        match node_type {
            "doc" => AdfNode::Doc {
                version: object
                    .get("version")
                    .and_then(Value::as_u64)
                    .unwrap_or(ADF_VERSION),
                content: children_from(object),
            },
            "paragraph" => AdfNode::Paragraph {
                content: children_from(object),
            },
            "text" => AdfNode::Text {
                text: object
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                marks: marks_from(object),
            },
            "codeBlock" => AdfNode::CodeBlock {
                attrs: attrs_from(object),
                content: children_from(object),
            },
            "bulletList" => AdfNode::BulletList {
                content: children_from(object),
            },
            "orderedList" => AdfNode::OrderedList {
                attrs: attrs_from(object),
                content: children_from(object),
            },
            "listItem" => AdfNode::ListItem {
                content: children_from(object),
            },
            "heading" => AdfNode::Heading {
                attrs: attrs_from(object),
                content: children_from(object),
            },
            "blockquote" => AdfNode::Blockquote {
                content: children_from(object),
            },
            "hardBreak" => AdfNode::HardBreak,
            "rule" => AdfNode::Rule,
            other => {
                trace!("Unknown ADF node type '{}'", other);
                AdfNode::Unknown {
                    node_type: other.to_string(),
                    attrs: attrs_from(object),
                    content: children_from(object),
                }
            }
        }
    }
}

impl From<Value> for AdfNode {
    fn from(value: Value) -> Self {
        AdfNode::from(&value)
    }
}

impl From<AdfNode> for Value {
    fn from(node: AdfNode) -> Self {
        let mut object = Map::new();
        object.insert(
            "type".to_string(),
            Value::String(node.node_type().to_string()),
        );

        let (attrs, content) = match node {
            AdfNode::Doc { version, content } => {
                object.insert("version".to_string(), Value::from(version));
                (None, Some(content))
            }
            AdfNode::Text { text, marks } => {
                object.insert("text".to_string(), Value::String(text));
                if !marks.is_empty() {
                    let marks = marks.into_iter().map(Value::from).collect();
                    object.insert("marks".to_string(), Value::Array(marks));
                }
                (None, None)
            }
            AdfNode::Paragraph { content }
            | AdfNode::BulletList { content }
            | AdfNode::ListItem { content }
            | AdfNode::Blockquote { content } => (None, Some(content)),
            AdfNode::CodeBlock { attrs, content }
            | AdfNode::OrderedList { attrs, content }
            | AdfNode::Heading { attrs, content }
            | AdfNode::Unknown { attrs, content, .. } => (Some(attrs), Some(content)),
            AdfNode::HardBreak | AdfNode::Rule => (None, None),
        };

        if let Some(attrs) = attrs.filter(|a| !a.is_empty()) {
            object.insert("attrs".to_string(), Value::Object(attrs));
        }
        if let Some(content) = content {
            let content = content.into_iter().map(Value::from).collect();
            object.insert("content".to_string(), Value::Array(content));
        }

        Value::Object(object)
    }
}

impl From<&Value> for Mark {
    fn from(value: &Value) -> Self {
        let object = value.as_object();
        let mark_type = object
            .and_then(|o| o.get("type"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let attrs = object.map(attrs_from).unwrap_or_default();

        match mark_type {
            "strong" => Mark::Strong,
            "em" => Mark::Em,
            "code" => Mark::Code,
            "strike" => Mark::Strike,
            "link" => Mark::Link {
                href: attrs.get("href").and_then(Value::as_str).map(String::from),
                attrs,
            },
            other => Mark::Other {
                mark_type: other.to_string(),
                attrs,
            },
        }
    }
}

impl From<Value> for Mark {
    fn from(value: Value) -> Self {
        Mark::from(&value)
    }
}

impl From<Mark> for Value {
    fn from(mark: Mark) -> Self {
        let (mark_type, attrs) = match mark {
            Mark::Strong => ("strong".to_string(), None),
            Mark::Em => ("em".to_string(), None),
            Mark::Code => ("code".to_string(), None),
            Mark::Strike => ("strike".to_string(), None),
            Mark::Link { href, mut attrs } => {
                if let Some(href) = href {
                    attrs.insert("href".to_string(), Value::String(href));
                }
                ("link".to_string(), Some(attrs))
            }
            Mark::Other { mark_type, attrs } => (mark_type, Some(attrs)),
        };

        let mut object = Map::new();
        object.insert("type".to_string(), Value::String(mark_type));
        if let Some(attrs) = attrs.filter(|a| !a.is_empty()) {
            object.insert("attrs".to_string(), Value::Object(attrs));
        }
        Value::Object(object)
    }
}
