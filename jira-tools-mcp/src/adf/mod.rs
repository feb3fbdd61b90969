//! Atlassian Document Format (ADF) conversion
//!
//! - [`markdown::render`] turns an ADF tree (or legacy plain string) into a
//!   markdown fragment for display.
//! - [`plain_text::extract_plain_text`] flattens a tree to bare text.
//! - [`builder::build_from_plain_text`] builds the paragraph-only document
//!   sent on issue, comment and worklog writes.
//!
//! All operations are pure functions over owned trees. `render(build(s))`
//! keeps the paragraph structure of `s`, but building from rendered rich
//! content does not restore headings, lists or marks.

pub mod builder;
pub mod input;
pub mod marks;
pub mod markdown;
pub mod node;
pub mod plain_text;

pub use builder::build_from_plain_text;
pub use input::AdfInput;
pub use marks::format_text;
pub use markdown::{render, render_node};
pub use node::{AdfNode, Attrs, Mark, ADF_VERSION};
pub use plain_text::{extract_node_text, extract_plain_text};

use serde_json::Value;

/// Zero-sized handle bundling the conversions, for callers that prefer a
/// value to pass around over free functions
#[derive(Debug, Clone, Copy, Default)]
pub struct AdfConverter;

impl AdfConverter {
    pub fn render(&self, input: &AdfInput) -> String {
        render(input)
    }

    pub fn format_text(&self, text: &str, marks: &[Mark]) -> String {
        format_text(text, marks)
    }

    pub fn build_from_plain_text(&self, text: Option<&str>) -> Option<AdfNode> {
        build_from_plain_text(text)
    }

    pub fn extract_plain_text(&self, input: &AdfInput) -> String {
        extract_plain_text(input)
    }
}

/// Render an optional JSON rich-text field straight to markdown
pub fn render_field(value: Option<&Value>) -> String {
    render(&AdfInput::from_field(value))
}

/// Extract plain text from an optional JSON rich-text field
pub fn plain_text_field(value: Option<&Value>) -> String {
    extract_plain_text(&AdfInput::from_field(value))
}

/// Build the JSON value for an outbound rich-text field, `None` when the
/// field must be omitted
pub fn plain_text_to_field(text: Option<&str>) -> Option<Value> {
    build_from_plain_text(text).map(Value::from)
}
