//! Source-control host seam

use async_trait::async_trait;

use crate::model::FileDiff;
use crate::Result;

/// Read access to pull requests on a source-control host
///
/// Both calls fail with [`crate::Error::Upstream`] when the host answers
/// with a non-success status.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// List every file changed by a pull request, removed ones included
    async fn list_pr_files(
        &self,
        repo_url: &str,
        pr_number: u64,
        token: Option<&str>,
    ) -> Result<Vec<FileDiff>>;

    /// Fetch the raw contents behind a file's `raw_url`
    async fn fetch_raw(&self, raw_url: &str, token: Option<&str>) -> Result<String>;
}
