//! Business-rule validation for tool parameters
//!
//! Shape and defaults are handled by serde on the `*Params` structs; the
//! helpers here check what serde cannot express and produce
//! `InvalidParameter` errors with messages an AI agent can act on.

use crate::error::{JiraMcpError, JiraMcpResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Jira's limit on comment and description bodies
pub const MAX_TEXT_LENGTH: usize = 32_768;

static ISSUE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*-[1-9][0-9]*$").unwrap());

static PROJECT_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9_]{0,9}$").unwrap());

/// Jira duration: one or more `<number><unit>` groups, units w/d/h/m
static TIME_SPENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?[wdhm](\s+\d+(\.\d+)?[wdhm])*$").unwrap());

/// Validate and normalize an issue key such as `proj-123` to `PROJ-123`
pub fn validate_issue_key(issue_key: &str) -> JiraMcpResult<String> {
    let normalized = issue_key.trim().to_uppercase();

    if normalized.is_empty() {
        return Err(JiraMcpError::invalid_param(
            "issue_key",
            "Issue key is required. Please provide a Jira issue key (e.g., 'PROJ-123'). Use the search_issues tool first to find issues if you don't know the key.",
        ));
    }

    if !ISSUE_KEY.is_match(&normalized) {
        return Err(JiraMcpError::invalid_param(
            "issue_key",
            format!(
                "Issue key must be in format 'PROJECT-NUMBER' (e.g., 'PROJ-123'), got '{}'",
                issue_key
            ),
        ));
    }

    Ok(normalized)
}

/// Validate and normalize a project key such as `proj` to `PROJ`
pub fn validate_project_key(project_key: &str) -> JiraMcpResult<String> {
    let normalized = project_key.trim().to_uppercase();

    if !PROJECT_KEY.is_match(&normalized) {
        return Err(JiraMcpError::invalid_param(
            "project_key",
            format!(
                "Project key must be 1-10 letters, digits or underscores starting with a letter, got '{}'",
                project_key
            ),
        ));
    }

    Ok(normalized)
}

/// Resolve an optional page size against the configured maximum
pub fn validate_limit(limit: Option<u32>, max: u32) -> JiraMcpResult<u32> {
    match limit {
        None => Ok(max),
        Some(0) => Err(JiraMcpError::invalid_param(
            "limit",
            "Limit must be greater than 0",
        )),
        Some(limit) if limit > max => Err(JiraMcpError::invalid_param(
            "limit",
            format!("Limit cannot exceed {}", max),
        )),
        Some(limit) => Ok(limit),
    }
}

/// Validate a Jira duration such as `3h 30m`, `1d` or `45m`
pub fn validate_time_spent(time_spent: &str) -> JiraMcpResult<String> {
    let normalized = time_spent.trim().to_lowercase();

    if !TIME_SPENT.is_match(&normalized) {
        return Err(JiraMcpError::invalid_param(
            "time_spent",
            format!(
                "Time spent must use Jira duration format like '2h', '1d 4h' or '30m', got '{}'",
                time_spent
            ),
        ));
    }

    Ok(normalized)
}

/// Reject required text that is blank
pub fn validate_required_text(parameter: &str, text: &str) -> JiraMcpResult<()> {
    if text.trim().is_empty() {
        return Err(JiraMcpError::invalid_param(
            parameter,
            format!("{} cannot be empty", parameter),
        ));
    }
    validate_text_length(parameter, text)
}

/// Reject text over Jira's body size limit
pub fn validate_text_length(parameter: &str, text: &str) -> JiraMcpResult<()> {
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(JiraMcpError::invalid_param(
            parameter,
            format!("{} cannot exceed {} characters", parameter, MAX_TEXT_LENGTH),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("PROJ-123", "PROJ-123")]
    #[case(" proj-1 ", "PROJ-1")]
    #[case("AB_2-99", "AB_2-99")]
    fn test_valid_issue_keys(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_issue_key(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("PROJ")]
    #[case("PROJ-")]
    #[case("123-PROJ")]
    #[case("PROJ-0")]
    #[case("PR OJ-1")]
    fn test_invalid_issue_keys(#[case] input: &str) {
        assert_matches!(
            validate_issue_key(input),
            Err(JiraMcpError::InvalidParameter { ref parameter, .. }) if parameter == "issue_key"
        );
    }

    #[test]
    fn test_project_key() {
        assert_eq!(validate_project_key("dev").unwrap(), "DEV");
        assert!(validate_project_key("").is_err());
        assert!(validate_project_key("1DEV").is_err());
        assert!(validate_project_key("WAYTOOLONGKEY").is_err());
    }

    #[test]
    fn test_limit() {
        assert_eq!(validate_limit(None, 50).unwrap(), 50);
        assert_eq!(validate_limit(Some(10), 50).unwrap(), 10);
        assert!(validate_limit(Some(0), 50).is_err());
        assert!(validate_limit(Some(51), 50).is_err());
    }

    #[rstest]
    #[case("2h")]
    #[case("1d 4h")]
    #[case("1w 2d 3h 30m")]
    #[case("1.5h")]
    #[case(" 30M ")]
    fn test_valid_time_spent(#[case] input: &str) {
        assert!(validate_time_spent(input).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("two hours")]
    #[case("2")]
    #[case("h2")]
    #[case("2x")]
    fn test_invalid_time_spent(#[case] input: &str) {
        assert!(validate_time_spent(input).is_err());
    }

    #[test]
    fn test_text_rules() {
        assert!(validate_required_text("comment", "  ").is_err());
        assert!(validate_required_text("comment", "ok").is_ok());
        let long = "x".repeat(MAX_TEXT_LENGTH + 1);
        assert!(validate_text_length("comment", &long).is_err());
    }
}
