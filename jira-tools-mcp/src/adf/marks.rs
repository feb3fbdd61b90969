//! Inline mark formatting for text runs

use crate::adf::node::Mark;

/// Apply marks to a text run, in order
///
/// Each mark wraps the output of the previous one, so `[Code, Strong]`
/// yields ``**`t`**`` while `[Strong, Code]` yields `` `**t**` ``.
pub fn format_text(text: &str, marks: &[Mark]) -> String {
    marks
        .iter()
        .fold(text.to_string(), |formatted, mark| apply_mark(formatted, mark))
}

fn apply_mark(text: String, mark: &Mark) -> String {
    match mark {
        Mark::Strong => format!("**{}**", text),
        Mark::Em => format!("*{}*", text),
        Mark::Code => format!("`{}`", text),
        Mark::Strike => format!("~~{}~~", text),
        Mark::Link {
            href: Some(href), ..
        } if !href.is_empty() => format!("[{}]({})", text, href),
        Mark::Link { .. } | Mark::Other { .. } => text,
    }
}
