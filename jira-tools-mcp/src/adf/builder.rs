//! Plain text to ADF conversion for outbound writes
//!
//! Only paragraphs of unmarked text are produced. Callers that get `None`
//! back must leave the field out of the request entirely; Jira rejects
//! empty documents.

use crate::adf::node::AdfNode;
use once_cell::sync::Lazy;
use regex::Regex;

/// Two or more newlines, with any whitespace around or between them
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Build a `doc` with one paragraph per blank-line separated block
///
/// Returns `None` for missing, empty or whitespace-only input.
pub fn build_from_plain_text(text: Option<&str>) -> Option<AdfNode> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }

    let paragraphs: Vec<AdfNode> = PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| AdfNode::paragraph(vec![AdfNode::text(segment)]))
        .collect();

    if paragraphs.is_empty() {
        return None;
    }

    Some(AdfNode::doc(paragraphs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adf::markdown::render_node;
    use serde_json::json;

    fn paragraph_texts(doc: &AdfNode) -> Vec<String> {
        doc.children()
            .iter()
            .map(|p| match p.children() {
                [AdfNode::Text { text, marks }] if marks.is_empty() => text.clone(),
                other => panic!("unexpected paragraph content: {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_empty_inputs_yield_none() {
        assert_eq!(build_from_plain_text(None), None);
        assert_eq!(build_from_plain_text(Some("")), None);
        assert_eq!(build_from_plain_text(Some("   ")), None);
        assert_eq!(build_from_plain_text(Some("\n\n\n")), None);
        assert_eq!(build_from_plain_text(Some(" \t\n \n")), None);
    }

    #[test]
    fn test_paragraph_count() {
        let doc = build_from_plain_text(Some("A\n\nB\n\nC")).unwrap();
        assert_eq!(paragraph_texts(&doc), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_exact_wire_shape() {
        let doc = build_from_plain_text(Some("Fixed bug\n\nAlso updated docs")).unwrap();
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
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

    #[test]
    fn test_many_newlines_collapse() {
        let doc = build_from_plain_text(Some("First\n\n\n\n\nSecond")).unwrap();
        assert_eq!(paragraph_texts(&doc), vec!["First", "Second"]);
    }

    #[test]
    fn test_whitespace_only_separator_lines() {
        let doc = build_from_plain_text(Some("First  \n   \t \n  Second")).unwrap();
        assert_eq!(paragraph_texts(&doc), vec!["First", "Second"]);
    }

    #[test]
    fn test_single_newline_preserved() {
        let doc = build_from_plain_text(Some("  line one\nline two  \n\nnext  ")).unwrap();
        assert_eq!(paragraph_texts(&doc), vec!["line one\nline two", "next"]);
    }

    #[test]
    fn test_crlf_input() {
        let doc = build_from_plain_text(Some("One\r\n\r\nTwo")).unwrap();
        assert_eq!(paragraph_texts(&doc), vec!["One", "Two"]);
    }

    #[test]
    fn test_render_of_built_document() {
        let doc = build_from_plain_text(Some("A\n\nB")).unwrap();
        assert_eq!(render_node(&doc), "A\n\nB\n\n");
    }
}
