//! End-to-end ADF conversion through the public API, from JSON as Jira
//! returns it to the markdown and request bodies the tools produce

use jira_tools_mcp::adf::{self, AdfInput, AdfNode, Mark};
use jira_tools_mcp::formatters;
use rstest::rstest;
use serde_json::{json, Value};

fn render_json(value: Value) -> String {
    adf::render(&AdfInput::from(&value))
}

#[rstest]
#[case::bold_paragraph(
    json!({"type": "paragraph", "content": [{"type": "text", "text": "bold", "marks": [{"type": "strong"}]}]}),
    "**bold**\n\n"
)]
#[case::code_block(
    json!({"type": "codeBlock", "attrs": {"language": "javascript"}, "content": [{"type": "text", "text": "x=1;"}]}),
    "```javascript\nx=1;\n```\n\n"
)]
#[case::clamped_heading(
    json!({"type": "heading", "attrs": {"level": 10}, "content": [{"type": "text", "text": "Deep"}]}),
    "###### Deep\n\n"
)]
#[case::blockquote_keeps_quoted_blank_lines(
    json!({"type": "blockquote", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Q"}]}]}),
    "> Q\n> \n> \n\n"
)]
#[case::unknown_type_renders_children(
    json!({"type": "weirdType", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Y"}]}]}),
    "Y\n\n"
)]
fn test_render_scenarios(#[case] input: Value, #[case] expected: &str) {
    assert_eq!(render_json(input), expected);
}

#[test]
fn test_render_realistic_description() {
    let description = json!({
        "type": "doc",
        "version": 1,
        "content": [
            {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Steps"}]},
            {"type": "orderedList", "attrs": {"order": 1}, "content": [
                {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Open the app"}]}]},
                {"type": "listItem", "content": [{"type": "paragraph", "content": [
                    {"type": "text", "text": "Click "},
                    {"type": "text", "text": "Login", "marks": [{"type": "code"}]}
                ]}]}
            ]},
            {"type": "rule"},
            {"type": "paragraph", "content": [
                {"type": "text", "text": "See "},
                {"type": "text", "text": "docs", "marks": [{"type": "link", "attrs": {"href": "https://example.com"}}]}
            ]}
        ]
    });

    assert_eq!(
        render_json(description),
        "## Steps\n\n1. Open the app\n\n2. Click `Login`\n\n\n\n---\n\nSee [docs](https://example.com)\n\n"
    );
}

#[test]
fn test_string_and_absent_inputs() {
    assert_eq!(render_json(json!("legacy *wiki* text")), "legacy *wiki* text");
    assert_eq!(render_json(Value::Null), "");
    assert_eq!(adf::render(&AdfInput::Absent), "");
    assert_eq!(adf::extract_plain_text(&AdfInput::from(&json!("raw"))), "raw");
}

#[test]
fn test_mark_order_is_significant() {
    assert_eq!(adf::format_text("t", &[Mark::Strong, Mark::Em]), "***t***");
    assert_eq!(adf::format_text("t", &[Mark::Code, Mark::Strong]), "**`t`**");
    assert_eq!(adf::format_text("t", &[Mark::Strong, Mark::Code]), "`**t**`");
}

#[test]
fn test_builder_output_is_the_wire_shape() {
    let doc = adf::build_from_plain_text(Some("Fixed bug\n\nAlso updated docs")).unwrap();

    assert_eq!(
        Value::from(doc),
        json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "Fixed bug"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "Also updated docs"}]}
            ]
        })
    );
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("   "))]
#[case(Some("\n\n\n"))]
fn test_builder_returns_none_for_blank_text(#[case] text: Option<&str>) {
    assert!(adf::build_from_plain_text(text).is_none());
    assert!(adf::plain_text_to_field(text).is_none());
}

#[test]
fn test_built_document_renders_back_to_its_paragraphs() {
    let doc = adf::build_from_plain_text(Some("A\n\nB\n\nC")).unwrap();
    assert_eq!(adf::render_node(&doc), "A\n\nB\n\nC\n\n");
    assert_eq!(adf::extract_node_text(&doc), "ABC");
}

#[test]
fn test_extract_plain_text_drops_marks() {
    let doc = json!({
        "type": "doc",
        "content": [{"type": "paragraph", "content": [
            {"type": "text", "text": "Hello "},
            {"type": "text", "text": "world", "marks": [{"type": "strong"}]}
        ]}]
    });
    assert_eq!(adf::extract_plain_text(&AdfInput::from(&doc)), "Hello world");
}

#[test]
fn test_node_round_trips_through_json() {
    let value = json!({
        "type": "doc",
        "version": 1,
        "content": [{"type": "mediaSingle", "attrs": {"layout": "center"}, "content": []}]
    });
    let node = AdfNode::from(&value);
    assert_eq!(node.children()[0].node_type(), "mediaSingle");
    assert_eq!(Value::from(node), value);
}

#[test]
fn test_rendered_fragment_embeds_in_issue_view() {
    let issue = json!({
        "key": "DEV-1",
        "fields": {
            "summary": "Crash on save",
            "description": {"type": "doc", "version": 1, "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "Happens every time"}]}
            ]}
        }
    });

    let markdown = formatters::format_issue(&issue);
    assert_eq!(markdown.matches("# DEV-1").count(), 1);
    assert!(markdown.ends_with("## Description\n\nHappens every time\n"));
}
