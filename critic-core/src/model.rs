//! Request, task and result types shared by every layer

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A request to review one pull request
#[derive(Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Repository URL, e.g. `https://github.com/acme/widgets`
    pub repo_url: String,
    /// Pull request number
    pub pr_number: u64,
    /// Token for private repositories
    #[serde(default, skip_serializing)]
    pub github_token: Option<String>,
}

impl AnalysisRequest {
    pub fn new(repo_url: impl Into<String>, pr_number: u64) -> Self {
        Self {
            repo_url: repo_url.into(),
            pr_number,
            github_token: None,
        }
    }

    /// Attach an access token; blank tokens are ignored
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.trim().is_empty());
        self
    }
}

impl fmt::Debug for AnalysisRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisRequest")
            .field("repo_url", &self.repo_url)
            .field("pr_number", &self.pr_number)
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Opaque handle correlating a submission with its status and result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a submitted task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// Reported for identifiers the store does not know; never persisted
    Unknown,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Unknown => "unknown",
        }
    }

    /// Completed and failed tasks never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            "unknown" => Ok(TaskStatus::Unknown),
            other => Err(Error::Other(format!("unrecognized task status: {}", other))),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change type of a file in a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Unchanged,
    #[serde(other)]
    Changed,
}

/// One changed file as listed by the source-control host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub filename: String,
    pub status: FileStatus,
    pub raw_url: String,
}

/// Category of a review finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Style,
    Bug,
    Performance,
    BestPractice,
}

impl FromStr for IssueKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "style" => Ok(IssueKind::Style),
            "bug" => Ok(IssueKind::Bug),
            "performance" => Ok(IssueKind::Performance),
            "best_practice" | "best_practices" => Ok(IssueKind::BestPractice),
            other => Err(Error::MalformedResponse(format!("unknown issue type: {}", other))),
        }
    }
}

/// A single finding reported for a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub line: u32,
    pub description: String,
    pub suggestion: String,
}

impl Issue {
    pub fn is_critical(&self) -> bool {
        self.kind == IssueKind::Bug
    }
}

/// Findings for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub name: String,
    pub issues: Vec<Issue>,
}

impl FileReport {
    pub fn new(name: impl Into<String>, issues: Vec<Issue>) -> Self {
        Self {
            name: name.into(),
            issues,
        }
    }

    /// A report for a file whose review could not be read
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// Totals across every reviewed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_files: usize,
    pub total_issues: usize,
    pub critical_issues: usize,
}

impl Summary {
    pub fn from_files(files: &[FileReport]) -> Self {
        let issues = files.iter().flat_map(|f| f.issues.iter());
        Self {
            total_files: files.len(),
            total_issues: files.iter().map(|f| f.issues.len()).sum(),
            critical_issues: issues.filter(|i| i.is_critical()).count(),
        }
    }
}

/// Outcome of reviewing a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub files: Vec<FileReport>,
    pub summary: Summary,
}

impl AnalysisResult {
    /// Build a result whose summary always agrees with its reports
    pub fn from_reports(files: Vec<FileReport>) -> Self {
        let summary = Summary::from_files(&files);
        Self { files, summary }
    }
}
