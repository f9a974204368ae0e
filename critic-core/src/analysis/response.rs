//! Parsing of the model's review answer into issues

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::model::{Issue, IssueKind};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ReviewPayload {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    line: Value,
    #[serde(default)]
    description: String,
    #[serde(default)]
    suggestion: String,
}

/// Parse the JSON issue list returned by the model
///
/// Fails with [`Error::MalformedResponse`] when the content is not a JSON
/// object of the expected shape. Issues of an unrecognized type are dropped.
pub fn parse_issues(content: &str) -> Result<Vec<Issue>> {
    let json = strip_code_fence(content);
    let payload: ReviewPayload = serde_json::from_str(json)
        .map_err(|e| Error::MalformedResponse(format!("{} in {:?}", e, preview(json))))?;

    let mut issues = Vec::with_capacity(payload.issues.len());
    for raw in payload.issues {
        let kind = match raw.kind.parse::<IssueKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(error = %e, "Dropping issue with unrecognized type");
                continue;
            }
        };

        issues.push(Issue {
            kind,
            line: line_number(&raw.line),
            description: raw.description,
            suggestion: raw.suggestion,
        });
    }

    Ok(issues)
}

/// Models sometimes wrap JSON in a Markdown fence
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening line
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn line_number(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn preview(s: &str) -> &str {
    match s.char_indices().nth(120) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let content = r#"{"issues": [
            {"type": "bug", "line": 12, "description": "Off by one", "suggestion": "Use <"},
            {"type": "style", "line": 3, "description": "Long line", "suggestion": "Wrap it"}
        ]}"#;
        let issues = parse_issues(content).unwrap();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].kind, IssueKind::Bug);
        assert_eq!(issues[0].line, 12);
        assert_eq!(issues[1].description, "Long line");
    }

    #[test]
    fn test_parse_fenced_json() {
        let content = "```json\n{\"issues\": [{\"type\": \"performance\", \"line\": 4, \"description\": \"N+1\", \"suggestion\": \"Batch\"}]}\n```";
        let issues = parse_issues(content).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Performance);
    }

    #[test]
    fn test_parse_single_line_fence() {
        let content = "```{\"issues\": [{\"type\": \"bug\", \"line\": 2, \"description\": \"Null deref\", \"suggestion\": \"Check first\"}]}```";
        let issues = parse_issues(content).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 2);
    }

    #[test]
    fn test_strip_single_line_fence_with_info_string() {
        assert_eq!(strip_code_fence("```json{\"issues\": []}```"), "{\"issues\": []}");
        assert_eq!(strip_code_fence("```{}```"), "{}");
    }

    #[test]
    fn test_missing_issues_key_means_no_issues() {
        assert!(parse_issues("{}").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_kind_dropped_and_lenient_fields() {
        let content = r#"{"issues": [
            {"type": "security", "line": 1, "description": "x", "suggestion": "y"},
            {"type": "best_practice", "line": "7", "description": "Use const"},
            {"type": "bug", "line": null, "description": "z", "suggestion": "w"}
        ]}"#;
        let issues = parse_issues(content).unwrap();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].kind, IssueKind::BestPractice);
        assert_eq!(issues[0].line, 7);
        assert_eq!(issues[0].suggestion, "");
        assert_eq!(issues[1].line, 0);
    }

    #[test]
    fn test_prose_is_malformed() {
        let err = parse_issues("Looks good to me!").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_top_level_array_is_malformed() {
        let err = parse_issues(r#"[{"type": "bug"}]"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
