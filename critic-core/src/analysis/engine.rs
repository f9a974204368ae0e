//! Pull request analysis: list, fetch, review, aggregate

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::completion::CompletionClient;
use super::language::detect_language;
use super::prompt::{build_user_message, SYSTEM_PROMPT};
use super::response::parse_issues;
use super::source::SourceHost;
use crate::model::{AnalysisRequest, AnalysisResult, FileDiff, FileReport, FileStatus};
use crate::{Error, Result};

/// Reviews every changed file of a pull request with the AI endpoint
#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn SourceHost>,
    completion: Arc<dyn CompletionClient>,
    default_token: Option<String>,
}

impl Analyzer {
    pub fn new(source: Arc<dyn SourceHost>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            source,
            completion,
            default_token: None,
        }
    }

    /// Token used when a request does not bring its own
    pub fn with_default_token(mut self, token: Option<String>) -> Self {
        self.default_token = token;
        self
    }

    /// Analyze a pull request
    ///
    /// Host and AI endpoint failures abort the whole analysis. A file whose
    /// review cannot be parsed contributes an empty report instead.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let token = request
            .github_token
            .as_deref()
            .or(self.default_token.as_deref());

        let files = self
            .source
            .list_pr_files(&request.repo_url, request.pr_number, token)
            .await?;

        info!(
            repo = %request.repo_url,
            pr = request.pr_number,
            files = files.len(),
            "Analyzing pull request"
        );

        let mut reports = Vec::new();
        for file in files.iter().filter(|f| f.status != FileStatus::Removed) {
            let content = self.source.fetch_raw(&file.raw_url, token).await?;

            let report = match self.review_file(file, &content).await {
                Ok(report) => report,
                Err(Error::MalformedResponse(reason)) => {
                    warn!(file = %file.filename, %reason, "Failed to parse AI analysis, reporting no issues");
                    FileReport::empty(&file.filename)
                }
                Err(e) => return Err(e),
            };
            reports.push(report);
        }

        let result = AnalysisResult::from_reports(reports);
        info!(
            repo = %request.repo_url,
            pr = request.pr_number,
            total_issues = result.summary.total_issues,
            critical_issues = result.summary.critical_issues,
            "Analysis finished"
        );

        Ok(result)
    }

    /// Review a single file; parse failures surface as `MalformedResponse`
    async fn review_file(&self, file: &FileDiff, content: &str) -> Result<FileReport> {
        let language = detect_language(&file.filename);
        debug!(file = %file.filename, language, "Reviewing file");

        let answer = self
            .completion
            .complete(SYSTEM_PROMPT, &build_user_message(language, content))
            .await?;
        let issues = parse_issues(&answer)?;

        Ok(FileReport::new(&file.filename, issues))
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fakes::{FakeCompletion, FakeSource};
    use crate::model::IssueKind;

    const ONE_BUG: &str = r#"{"issues": [{"type": "bug", "line": 3, "description": "Null deref", "suggestion": "Check for None"}]}"#;

    fn analyzer(source: FakeSource, completion: FakeCompletion) -> (Analyzer, Arc<FakeSource>, Arc<FakeCompletion>) {
        let source = Arc::new(source);
        let completion = Arc::new(completion);
        (
            Analyzer::new(source.clone(), completion.clone()),
            source,
            completion,
        )
    }

    #[tokio::test]
    async fn test_removed_files_are_skipped() {
        let source = FakeSource::new()
            .with_file("src/new.rs", FileStatus::Added, "fn main() {}")
            .with_file("src/old.rs", FileStatus::Removed, "");
        let (analyzer, _, completion) = analyzer(source, FakeCompletion::always(ONE_BUG));

        let result = analyzer
            .analyze(&AnalysisRequest::new("https://github.com/acme/widgets", 42))
            .await
            .unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].name, "src/new.rs");
        assert_eq!(result.files[0].issues[0].kind, IssueKind::Bug);
        assert_eq!(result.summary.total_files, 1);
        assert_eq!(result.summary.total_issues, 1);
        assert_eq!(result.summary.critical_issues, 1);
        assert_eq!(completion.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_answer_yields_empty_report() {
        let source = FakeSource::new()
            .with_file("a.py", FileStatus::Modified, "x = 1")
            .with_file("b.py", FileStatus::Modified, "y = 2");
        let completion = FakeCompletion::sequence(vec!["not json at all", ONE_BUG]);
        let (analyzer, _, _) = analyzer(source, completion);

        let result = analyzer
            .analyze(&AnalysisRequest::new("https://github.com/acme/widgets", 1))
            .await
            .unwrap();

        assert_eq!(result.files.len(), 2);
        assert!(result.files[0].issues.is_empty());
        assert_eq!(result.files[1].issues.len(), 1);
        assert_eq!(result.summary.critical_issues, 1);
    }

    #[tokio::test]
    async fn test_critical_count_matches_bug_issues() {
        let mixed = r#"{"issues": [
            {"type": "bug", "line": 1, "description": "a", "suggestion": "b"},
            {"type": "style", "line": 2, "description": "c", "suggestion": "d"},
            {"type": "bug", "line": 3, "description": "e", "suggestion": "f"}
        ]}"#;
        let source = FakeSource::new()
            .with_file("a.go", FileStatus::Added, "package a")
            .with_file("b.go", FileStatus::Renamed, "package b");
        let (analyzer, _, _) = analyzer(source, FakeCompletion::always(mixed));

        let result = analyzer
            .analyze(&AnalysisRequest::new("https://github.com/acme/widgets", 7))
            .await
            .unwrap();

        let bugs = result
            .files
            .iter()
            .flat_map(|f| &f.issues)
            .filter(|i| i.kind == IssueKind::Bug)
            .count();
        assert_eq!(result.summary.critical_issues, bugs);
        assert_eq!(bugs, 4);
        assert_eq!(result.summary.total_issues, 6);
    }

    #[tokio::test]
    async fn test_listing_failure_is_upstream_error() {
        let (analyzer, _, completion) =
            analyzer(FakeSource::failing_listing(), FakeCompletion::always(ONE_BUG));

        let err = analyzer
            .analyze(&AnalysisRequest::new("https://github.com/acme/widgets", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(completion.calls(), 0);
    }

    #[tokio::test]
    async fn test_ai_failure_aborts_analysis() {
        let source = FakeSource::new().with_file("a.rs", FileStatus::Added, "fn a() {}");
        let (analyzer, _, _) = analyzer(source, FakeCompletion::failing());

        let err = analyzer
            .analyze(&AnalysisRequest::new("https://github.com/acme/widgets", 1))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_request_token_preferred_over_default() {
        let source = FakeSource::new().with_file("a.rs", FileStatus::Added, "fn a() {}");
        let (analyzer, source, _) = analyzer(source, FakeCompletion::always(ONE_BUG));
        let analyzer = analyzer.with_default_token(Some("fallback".to_string()));

        let request = AnalysisRequest::new("https://github.com/acme/widgets", 1)
            .with_token(Some("own".to_string()));
        analyzer.analyze(&request).await.unwrap();
        assert_eq!(source.last_token().as_deref(), Some("own"));

        analyzer
            .analyze(&AnalysisRequest::new("https://github.com/acme/widgets", 1))
            .await
            .unwrap();
        assert_eq!(source.last_token().as_deref(), Some("fallback"));
    }
}
