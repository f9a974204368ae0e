//! Pull request file listing

use critic_core::{FileDiff, FileStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{GitHubClient, Result};

/// GitHub's page size limit for this endpoint
const PER_PAGE: usize = 100;

/// GitHub stops listing after 3000 files
const MAX_PAGES: u32 = 30;

#[derive(Debug, Serialize)]
struct PageQuery {
    per_page: usize,
    page: u32,
}

/// One entry of `GET /repos/{owner}/{repo}/pulls/{n}/files`
#[derive(Debug, Deserialize)]
struct PullFile {
    filename: String,
    status: FileStatus,
    #[serde(default)]
    raw_url: Option<String>,
}

impl PullFile {
    fn into_diff(self) -> Option<FileDiff> {
        match self.raw_url {
            Some(raw_url) => Some(FileDiff {
                filename: self.filename,
                status: self.status,
                raw_url,
            }),
            None => {
                debug!(file = %self.filename, "Skipping file without raw content");
                None
            }
        }
    }
}

impl GitHubClient {
    /// List every file a pull request changes, following pagination
    pub async fn pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        token: Option<&str>,
    ) -> Result<Vec<FileDiff>> {
        let octocrab = self.octocrab(token)?;
        let route = format!("/repos/{}/{}/pulls/{}/files", owner, repo, pr_number);

        let mut files = Vec::new();
        for page in 1..=MAX_PAGES {
            let query = PageQuery {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<PullFile> = octocrab.get(&route, Some(&query)).await?;
            let fetched = batch.len();
            debug!(page, fetched, "Fetched pull request files page");

            files.extend(batch.into_iter().filter_map(PullFile::into_diff));
            if fetched < PER_PAGE {
                break;
            }
        }

        info!(
            owner = %owner,
            repo = %repo,
            pr = pr_number,
            files = files.len(),
            "Listed pull request files"
        );

        Ok(files)
    }
}
