//! Markdown presentation of Jira resources
//!
//! Tools return these strings alongside their structured results. Rich-text
//! fields are converted with the ADF renderer and embedded as fragments.

use crate::adf;
use crate::cache::{BoardInfo, ProjectInfo};
use crate::tools::boards::SprintInfo;
use serde_json::Value;
use std::fmt::Write;

/// Length of the plain-text description snippet in issue lists
pub const SNIPPET_LENGTH: usize = 120;

fn text_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn name_or<'a>(value: &'a Value, pointer: &str, fallback: &'a str) -> &'a str {
    text_at(value, pointer).unwrap_or(fallback)
}

/// Rendered rich text, or a placeholder when it renders to nothing
fn rich_text_or(value: Option<&Value>, placeholder: &str) -> String {
    let rendered = adf::render_field(value);
    let trimmed = rendered.trim_end();
    if trimmed.trim().is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Collapse whitespace and cut to `max_chars`, appending `...` when cut
pub fn snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Full issue view: header, metadata list and rendered description
pub fn format_issue(issue: &Value) -> String {
    let key = name_or(issue, "/key", "UNKNOWN");
    let fields = issue.get("fields").unwrap_or(&Value::Null);

    let labels = fields
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|labels| !labels.is_empty())
        .unwrap_or_else(|| "None".to_string());

    let mut output = String::new();
    let _ = writeln!(
        output,
        "# {}: {}\n",
        key,
        name_or(fields, "/summary", "(no summary)")
    );
    let _ = writeln!(output, "- **Status:** {}", name_or(fields, "/status/name", "Unknown"));
    let _ = writeln!(output, "- **Type:** {}", name_or(fields, "/issuetype/name", "Unknown"));
    let _ = writeln!(output, "- **Priority:** {}", name_or(fields, "/priority/name", "None"));
    let _ = writeln!(
        output,
        "- **Assignee:** {}",
        name_or(fields, "/assignee/displayName", "Unassigned")
    );
    let _ = writeln!(
        output,
        "- **Reporter:** {}",
        name_or(fields, "/reporter/displayName", "Unknown")
    );
    let _ = writeln!(output, "- **Created:** {}", name_or(fields, "/created", "Unknown"));
    let _ = writeln!(output, "- **Updated:** {}", name_or(fields, "/updated", "Unknown"));
    let _ = writeln!(output, "- **Labels:** {}", labels);
    let _ = writeln!(
        output,
        "\n## Description\n\n{}",
        rich_text_or(fields.get("description"), "_No description_")
    );

    output
}

/// One comment as a level-3 section
pub fn format_comment(comment: &Value) -> String {
    format!(
        "### {} ({})\n\n{}\n",
        name_or(comment, "/author/displayName", "Unknown"),
        name_or(comment, "/created", "unknown date"),
        rich_text_or(comment.get("body"), "_Empty comment_")
    )
}

/// All comments, newest last, under a `## Comments` heading
pub fn format_comments(comments: &[Value]) -> String {
    if comments.is_empty() {
        return "## Comments\n\n_No comments_\n".to_string();
    }
    let body = comments
        .iter()
        .map(format_comment)
        .collect::<Vec<_>>()
        .join("\n");
    format!("## Comments ({})\n\n{}", comments.len(), body)
}

/// One worklog entry as a level-3 section
pub fn format_worklog(worklog: &Value) -> String {
    format!(
        "### {} logged {} (started {})\n\n{}\n",
        name_or(worklog, "/author/displayName", "Unknown"),
        name_or(worklog, "/timeSpent", "0m"),
        name_or(worklog, "/started", "unknown"),
        rich_text_or(worklog.get("comment"), "_No comment_")
    )
}

/// All worklogs under a `## Worklogs` heading
pub fn format_worklogs(worklogs: &[Value]) -> String {
    if worklogs.is_empty() {
        return "## Worklogs\n\n_No work logged_\n".to_string();
    }
    let body = worklogs
        .iter()
        .map(format_worklog)
        .collect::<Vec<_>>()
        .join("\n");
    format!("## Worklogs ({})\n\n{}", worklogs.len(), body)
}

/// Search results, one bullet per issue with a plain-text snippet
pub fn format_issue_list(issues: &[Value], has_more: bool) -> String {
    if issues.is_empty() {
        return "No issues found.\n".to_string();
    }

    let mut output = if has_more {
        format!("Found {} issues (more available)\n\n", issues.len())
    } else {
        format!("Found {} issues\n\n", issues.len())
    };
    for issue in issues {
        let fields = issue.get("fields").unwrap_or(&Value::Null);
        let _ = writeln!(
            output,
            "- **{}** {} [{}] ({})",
            name_or(issue, "/key", "UNKNOWN"),
            name_or(fields, "/summary", "(no summary)"),
            name_or(fields, "/status/name", "Unknown"),
            name_or(fields, "/assignee/displayName", "Unassigned"),
        );
        let description = snippet(
            &adf::plain_text_field(fields.get("description")),
            SNIPPET_LENGTH,
        );
        if !description.is_empty() {
            let _ = writeln!(output, "  {}", description);
        }
    }
    output
}

pub fn format_project_list(projects: &[ProjectInfo]) -> String {
    if projects.is_empty() {
        return "No projects found.\n".to_string();
    }

    let mut output = format!("## Projects ({})\n\n", projects.len());
    for project in projects {
        let _ = write!(output, "- **{}** {}", project.key, project.name);
        if let Some(project_type) = &project.project_type {
            let _ = write!(output, " ({})", project_type);
        }
        if let Some(lead) = &project.lead {
            let _ = write!(output, ", lead: {}", lead);
        }
        output.push('\n');
    }
    output
}

pub fn format_board_list(boards: &[BoardInfo]) -> String {
    if boards.is_empty() {
        return "No boards found.\n".to_string();
    }

    let mut output = format!("## Boards ({})\n\n", boards.len());
    for board in boards {
        let _ = write!(output, "- **{}** {} ({})", board.id, board.name, board.board_type);
        if let Some(project_key) = &board.project_key {
            let _ = write!(output, " in {}", project_key);
        }
        output.push('\n');
    }
    output
}

pub fn format_sprint_list(sprints: &[SprintInfo]) -> String {
    if sprints.is_empty() {
        return "No sprints found.\n".to_string();
    }

    let mut output = format!("## Sprints ({})\n\n", sprints.len());
    for sprint in sprints {
        let _ = write!(output, "- **{}** {} [{}]", sprint.id, sprint.name, sprint.state);
        match (&sprint.start_date, &sprint.end_date) {
            (Some(start), Some(end)) => {
                let _ = write!(output, " {} → {}", start, end);
            }
            (Some(start), None) => {
                let _ = write!(output, " from {}", start);
            }
            _ => {}
        }
        output.push('\n');
        if let Some(goal) = sprint.goal.as_deref().filter(|g| !g.trim().is_empty()) {
            let _ = writeln!(output, "  Goal: {}", goal.trim());
        }
    }
    output
}
