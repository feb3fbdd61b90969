//! ADF to markdown rendering
//!
//! Produces a markdown fragment suitable for embedding in larger documents
//! built by the formatters. Rendering is total: unknown node types fall back
//! to rendering their children and missing attributes take defaults.

use crate::adf::input::AdfInput;
use crate::adf::marks::format_text;
use crate::adf::node::AdfNode;

/// Render a rich-text field as markdown
///
/// Plain strings pass through unchanged and absent fields render as `""`.
pub fn render(input: &AdfInput) -> String {
    match input {
        AdfInput::Document(node) => render_node(node),
        AdfInput::PlainString(text) => text.clone(),
        AdfInput::Absent => String::new(),
    }
}

/// Render a single node (and its subtree) as markdown
pub fn render_node(node: &AdfNode) -> String {
    render_with_prefix(node, "")
}

fn render_children(children: &[AdfNode]) -> String {
    children.iter().map(render_node).collect()
}

/// `prefix` is the list marker handed down by a parent list; only
/// `listItem` consumes it.
fn render_with_prefix(node: &AdfNode, prefix: &str) -> String {
    match node {
        AdfNode::Doc { content, .. } => render_children(content),
        AdfNode::Paragraph { content } => format!("{}\n\n", render_children(content)),
        AdfNode::Text { text, marks } => format_text(text, marks),
        AdfNode::CodeBlock { attrs, content } => format!(
            "```{}\n{}\n```\n\n",
            AdfNode::code_language(attrs),
            render_children(content)
        ),
        AdfNode::BulletList { content } => {
            let items: String = content
                .iter()
                .map(|item| render_with_prefix(item, "- "))
                .collect();
            format!("{}\n", items)
        }
        AdfNode::OrderedList { content, .. } => {
            let items: String = content
                .iter()
                .enumerate()
                .map(|(index, item)| render_with_prefix(item, &format!("{}. ", index + 1)))
                .collect();
            format!("{}\n", items)
        }
        AdfNode::ListItem { content } => {
            format!("{}{}\n\n", prefix, render_children(content).trim())
        }
        AdfNode::Heading { attrs, content } => format!(
            "{} {}\n\n",
            "#".repeat(AdfNode::heading_level(attrs)),
            render_children(content)
        ),
        AdfNode::Blockquote { content } => {
            let quoted = render_children(content)
                .split('\n')
                .map(|line| format!("> {}", line))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{}\n\n", quoted)
        }
        AdfNode::HardBreak => "\n".to_string(),
        AdfNode::Rule => "\n---\n\n".to_string(),
        AdfNode::Unknown { content, .. } => render_children(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn render_json(value: Value) -> String {
        render(&AdfInput::from(&value))
    }

    #[test]
    fn test_passthrough_and_absent() {
        assert_eq!(render(&AdfInput::from("already *markdown*")), "already *markdown*");
        assert_eq!(render(&AdfInput::PlainString(String::new())), "");
        assert_eq!(render(&AdfInput::Absent), "");
    }

    #[test]
    fn test_paragraph_law() {
        let output = render_json(json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "X"}]}]
        }));
        assert_eq!(output, "X\n\n");
    }

    #[test]
    fn test_bold_paragraph() {
        let output = render_json(json!({
            "type": "paragraph",
            "content": [{"type": "text", "text": "bold", "marks": [{"type": "strong"}]}]
        }));
        assert_eq!(output, "**bold**\n\n");
    }

    #[test]
    fn test_code_block() {
        let output = render_json(json!({
            "type": "codeBlock",
            "attrs": {"language": "javascript"},
            "content": [{"type": "text", "text": "x=1;"}]
        }));
        assert_eq!(output, "```javascript\nx=1;\n```\n\n");

        let output = render_json(json!({
            "type": "codeBlock",
            "content": [{"type": "text", "text": "plain"}]
        }));
        assert_eq!(output, "```\nplain\n```\n\n");
    }

    #[rstest]
    #[case(json!({"level": 1}), "# H\n\n")]
    #[case(json!({"level": 3}), "### H\n\n")]
    #[case(json!({"level": 6}), "###### H\n\n")]
    #[case(json!({"level": 10}), "###### H\n\n")]
    #[case(json!({"level": 0}), "# H\n\n")]
    #[case(json!({}), "# H\n\n")]
    fn test_heading_clamp(#[case] attrs: Value, #[case] expected: &str) {
        let output = render_json(json!({
            "type": "heading",
            "attrs": attrs,
            "content": [{"type": "text", "text": "H"}]
        }));
        assert_eq!(output, expected);
    }

    #[test]
    fn test_heading_deep() {
        let output = render_json(json!({
            "type": "heading",
            "attrs": {"level": 10},
            "content": [{"type": "text", "text": "Deep"}]
        }));
        assert_eq!(output, "###### Deep\n\n");
    }

    #[test]
    fn test_bullet_list() {
        let output = render_json(json!({
            "type": "bulletList",
            "content": [
                {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "one"}]}]},
                {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "two"}]}]}
            ]
        }));
        assert_eq!(output, "- one\n\n- two\n\n\n");
    }

    #[test]
    fn test_ordered_list_indices() {
        let items: Vec<Value> = ["a", "b", "c"]
            .iter()
            .map(|t| json!({"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": t}]}]}))
            .collect();
        let output = render_json(json!({"type": "orderedList", "content": items}));
        assert_eq!(output, "1. a\n\n2. b\n\n3. c\n\n\n");
    }

    #[test]
    fn test_list_item_outside_list_has_no_prefix() {
        let output = render_json(json!({
            "type": "listItem",
            "content": [{"type": "text", "text": "  loose  "}]
        }));
        assert_eq!(output, "loose\n\n");
    }

    #[test]
    fn test_blockquote_keeps_quoted_blank_lines() {
        let output = render_json(json!({
            "type": "blockquote",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Q"}]}]
        }));
        assert_eq!(output, "> Q\n> \n> \n\n");
    }

    #[test]
    fn test_hard_break_and_rule() {
        let output = render_json(json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "line1"},
                    {"type": "hardBreak"},
                    {"type": "text", "text": "line2"}
                ]},
                {"type": "rule"}
            ]
        }));
        assert_eq!(output, "line1\nline2\n\n\n---\n\n");
    }

    #[test]
    fn test_unknown_type_fallback() {
        let output = render_json(json!({
            "type": "weirdType",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Y"}]}]
        }));
        assert_eq!(output, "Y\n\n");

        assert_eq!(render_json(json!({"type": "mention", "attrs": {"id": "1"}})), "");
    }

    #[test]
    fn test_missing_content_and_text() {
        assert_eq!(render_json(json!({"type": "paragraph"})), "\n\n");
        assert_eq!(render_json(json!({"type": "text"})), "");
        assert_eq!(render_json(json!({"type": "bulletList"})), "\n");
    }

    #[test]
    fn test_list_ignores_prefix_on_non_item_children() {
        let output = render_json(json!({
            "type": "bulletList",
            "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "loose"}]},
                {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "item"}]}]}
            ]
        }));
        assert_eq!(output, "loose\n\n- item\n\n\n");
    }
}
