//! Unformatted text extraction
//!
//! Used for search snippets and summaries where markdown syntax is noise.

use crate::adf::input::AdfInput;
use crate::adf::node::AdfNode;

/// Concatenate every text run of a rich-text field, ignoring all formatting
pub fn extract_plain_text(input: &AdfInput) -> String {
    match input {
        AdfInput::Document(node) => extract_node_text(node),
        AdfInput::PlainString(text) => text.clone(),
        AdfInput::Absent => String::new(),
    }
}

/// Concatenate the text runs below `node`
pub fn extract_node_text(node: &AdfNode) -> String {
    let mut output = String::new();
    collect_text(node, &mut output);
    output
}

fn collect_text(node: &AdfNode, output: &mut String) {
    match node {
        AdfNode::Text { text, .. } => output.push_str(text),
        other => {
            for child in other.children() {
                collect_text(child, output);
            }
        }
    }
}
